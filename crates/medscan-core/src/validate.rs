//! Validated construction of scan results from loosely-shaped JSON.
//!
//! Stored dashboard records may be partially formed. They are checked once
//! here so the comparison and report code can assume well-formed values.

use serde::Deserialize;
use thiserror::Error;

use crate::models::{Finding, ScanResult, SeverityLevel};

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid timestamp for {field}: {value}")]
    InvalidTimestamp { field: String, value: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Scan result as it may appear in storage.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScanResult {
    id: Option<String>,
    scan_id: Option<String>,
    #[serde(default)]
    abnormalities_detected: bool,
    confidence_score: Option<f64>,
    #[serde(default)]
    ai_model: String,
    findings: Option<Vec<RawFinding>>,
    #[serde(default)]
    severity: Option<String>,
    triage_priority: Option<i64>,
    #[serde(default)]
    raw_analysis: String,
    processed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFinding {
    id: Option<String>,
    area: Option<String>,
    #[serde(default)]
    description: String,
    confidence: Option<f64>,
    #[serde(default)]
    severity: Option<String>,
}

/// Parse and validate a stored scan result.
pub fn parse_scan_result(json: &str) -> ValidationResult<ScanResult> {
    let raw: RawScanResult = serde_json::from_str(json)?;
    raw.try_into()
}

impl TryFrom<RawScanResult> for ScanResult {
    type Error = ValidationError;

    fn try_from(raw: RawScanResult) -> Result<Self, Self::Error> {
        let id = required(raw.id, "id")?;
        let findings = required(raw.findings, "findings")?
            .into_iter()
            .enumerate()
            .map(|(i, f)| validate_finding(f, i))
            .collect::<ValidationResult<Vec<_>>>()?;

        let confidence_score = match raw.confidence_score {
            Some(c) => unit_interval(c, "confidenceScore")?,
            None => 0.0,
        };

        let triage_priority = match raw.triage_priority {
            Some(p) if (1..=10).contains(&p) => p as u8,
            Some(p) => {
                return Err(ValidationError::OutOfRange(format!(
                    "triagePriority must be 1-10, got {}",
                    p
                )))
            }
            None => return Err(ValidationError::MissingField("triagePriority".into())),
        };

        Ok(ScanResult {
            id,
            scan_id: required(raw.scan_id, "scanId")?,
            abnormalities_detected: raw.abnormalities_detected,
            confidence_score,
            ai_model: raw.ai_model,
            findings,
            severity: lenient_severity(raw.severity),
            triage_priority,
            raw_analysis: raw.raw_analysis,
            processed_at: normalize_timestamp(
                required(raw.processed_at, "processedAt")?,
                "processedAt",
            )?,
        })
    }
}

fn validate_finding(raw: RawFinding, index: usize) -> ValidationResult<Finding> {
    let area = required(raw.area, &format!("findings[{}].area", index))?;
    let confidence = match raw.confidence {
        Some(c) => unit_interval(c, &format!("findings[{}].confidence", index))?,
        None => 0.0,
    };

    Ok(Finding {
        id: raw
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        area,
        description: raw.description,
        confidence,
        severity: lenient_severity(raw.severity),
    })
}

fn required<T>(value: Option<T>, field: &str) -> ValidationResult<T> {
    value.ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

fn unit_interval(value: f64, field: &str) -> ValidationResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange(format!(
            "{} must be within [0, 1], got {}",
            field, value
        )))
    }
}

/// RFC 3339 timestamp rewritten in UTC, so stored values sort chronologically.
fn normalize_timestamp(value: String, field: &str) -> ValidationResult<String> {
    chrono::DateTime::parse_from_rfc3339(&value)
        .map(|ts| ts.with_timezone(&chrono::Utc).to_rfc3339())
        .map_err(|_| ValidationError::InvalidTimestamp {
            field: field.to_string(),
            value,
        })
}

fn lenient_severity(label: Option<String>) -> SeverityLevel {
    label
        .as_deref()
        .map(SeverityLevel::parse_lenient)
        .unwrap_or_default()
}
