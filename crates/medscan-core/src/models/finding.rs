//! Findings and scan results produced by the analysis pipeline.

use serde::{Deserialize, Serialize};

use super::severity::SeverityLevel;

/// A single localized observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Unique finding ID
    pub id: String,
    /// Anatomical/region label, the matching key across comparisons
    pub area: String,
    /// Free-text description
    pub description: String,
    /// Confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Per-finding severity
    pub severity: SeverityLevel,
}

impl Finding {
    /// Create a finding with a fresh ID.
    pub fn new(area: String, description: String, confidence: f64, severity: SeverityLevel) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            area,
            description,
            confidence,
            severity,
        }
    }
}

/// Structured output of one analysis run over one scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Unique result ID
    pub id: String,
    /// Owning scan
    pub scan_id: String,
    /// Whether any abnormality indicator was found
    pub abnormalities_detected: bool,
    /// Pipeline confidence (0.0 - 1.0)
    pub confidence_score: f64,
    /// Model that produced the raw analysis
    pub ai_model: String,
    /// Findings in detection order
    pub findings: Vec<Finding>,
    /// Overall severity, independent of per-finding severities
    pub severity: SeverityLevel,
    /// Triage priority (1 - 10)
    pub triage_priority: u8,
    /// Original AI text, verbatim
    pub raw_analysis: String,
    /// Processing timestamp (RFC 3339)
    pub processed_at: String,
}

impl ScanResult {
    /// Highest severity among the findings, if any.
    pub fn max_finding_severity(&self) -> Option<SeverityLevel> {
        self.findings.iter().map(|f| f.severity).max()
    }

    /// Look up a finding by area label (exact match).
    pub fn finding_for_area(&self, area: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.area == area)
    }
}
