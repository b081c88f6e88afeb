//! Keyword signal extraction from free-text analysis.
//!
//! Every category is independent and first-match-wins over a fixed,
//! ordered table:
//! - Scan type: x-ray → CT → MRI → ultrasound → other
//! - Body part: 15 anatomical terms → "unknown"
//! - Abnormality: union of indicator words (no negation handling)
//! - Severity: critical → high → medium → low → normal

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::models::{Finding, ScanType, SeverityLevel};

use super::text::{contains_any, find_first, fold, head_chars};

/// Scan type rules, checked in order.
const SCAN_TYPE_RULES: &[(&[&str], ScanType)] = &[
    (&["x-ray", "xray"], ScanType::Xray),
    (&["ct scan", "computed tomography"], ScanType::Ct),
    (&["mri", "magnetic resonance"], ScanType::Mri),
    (&["ultrasound", "sonogram"], ScanType::Ultrasound),
];

/// Anatomical terms, checked in order.
pub const BODY_PARTS: &[&str] = &[
    "brain", "chest", "lung", "heart", "abdomen", "liver", "kidney", "spine", "pelvis",
    "shoulder", "knee", "ankle", "wrist", "hand", "foot",
];

/// Body part when no anatomical term matches.
pub const UNKNOWN_BODY_PART: &str = "unknown";

/// Words that flag an abnormality anywhere in the text.
pub const ABNORMALITY_INDICATORS: &[&str] = &[
    "abnormal",
    "lesion",
    "mass",
    "tumor",
    "fracture",
    "inflammation",
    "infection",
    "pneumonia",
    "cancer",
    "growth",
    "concerning",
    "suspicious",
    "pathology",
    "irregular",
    "deformity",
    "degenerative",
    "break",
];

/// Severity tiers, checked from most to least severe.
const SEVERITY_TIERS: &[(&[&str], SeverityLevel)] = &[
    (&["critical", "severe", "emergent", "emergency"], SeverityLevel::Critical),
    (&["high severity", "high-severity", "significant", "concerning"], SeverityLevel::High),
    (&["moderate", "medium severity"], SeverityLevel::Medium),
    (&["mild", "low severity", "minimal"], SeverityLevel::Low),
];

/// Anchors for the main-finding excerpt, in priority order.
const FINDING_ANCHORS: &[&str] = &["finding", "abnormality", "observation", "impression"];

/// Maximum excerpt length in chars.
const EXCERPT_CHARS: usize = 300;

/// Structured signals extracted from one analysis text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedSignals {
    pub scan_type: ScanType,
    pub body_part: String,
    pub abnormalities_detected: bool,
    /// Zero or one synthesized finding
    pub findings: Vec<Finding>,
    pub severity: SeverityLevel,
}

/// Heuristic extractor for vision-model analysis text.
#[derive(Debug, Clone)]
pub struct SignalExtractor {
    finding_confidence: f64,
}

impl Default for SignalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalExtractor {
    /// Create an extractor with the default finding confidence.
    pub fn new() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            finding_confidence: config.finding_confidence,
        }
    }

    /// Extract all signals. Empty text yields the defaults.
    pub fn extract(&self, analysis_text: &str) -> ExtractedSignals {
        let folded = fold(analysis_text);

        let scan_type = detect_scan_type(&folded);
        let body_part = detect_body_part(&folded);
        let abnormalities_detected = detect_abnormalities(&folded);
        let severity = detect_severity(&folded);

        let findings = if abnormalities_detected {
            vec![Finding::new(
                body_part.clone(),
                main_finding_excerpt(analysis_text),
                self.finding_confidence,
                severity,
            )]
        } else {
            Vec::new()
        };

        ExtractedSignals {
            scan_type,
            body_part,
            abnormalities_detected,
            findings,
            severity,
        }
    }
}

fn detect_scan_type(folded: &str) -> ScanType {
    SCAN_TYPE_RULES
        .iter()
        .find(|(terms, _)| contains_any(folded, terms))
        .map(|(_, scan_type)| *scan_type)
        .unwrap_or(ScanType::Other)
}

fn detect_body_part(folded: &str) -> String {
    BODY_PARTS
        .iter()
        .find(|part| folded.contains(*part))
        .copied()
        .unwrap_or(UNKNOWN_BODY_PART)
        .to_string()
}

fn detect_abnormalities(folded: &str) -> bool {
    contains_any(folded, ABNORMALITY_INDICATORS)
}

fn detect_severity(folded: &str) -> SeverityLevel {
    SEVERITY_TIERS
        .iter()
        .find(|(terms, _)| contains_any(folded, terms))
        .map(|(_, level)| *level)
        .unwrap_or(SeverityLevel::Normal)
}

/// Excerpt describing the main finding.
///
/// Starts at the first anchor term and runs up to 300 chars, cut after the
/// first sentence end inside that window. Without an anchor, the head of the
/// text with an ellipsis.
pub fn main_finding_excerpt(text: &str) -> String {
    let folded = fold(text);
    match find_first(&folded, FINDING_ANCHORS) {
        Some((idx, _)) => {
            let window = head_chars(&text[idx..], EXCERPT_CHARS);
            match window.find(". ") {
                Some(end) => window[..=end].to_string(),
                None => window.to_string(),
            }
        }
        None => format!("{}...", head_chars(text, EXCERPT_CHARS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_defaults() {
        let signals = SignalExtractor::new().extract("");
        assert_eq!(signals.scan_type, ScanType::Other);
        assert_eq!(signals.body_part, "unknown");
        assert!(!signals.abnormalities_detected);
        assert!(signals.findings.is_empty());
        assert_eq!(signals.severity, SeverityLevel::Normal);
    }

    #[test]
    fn test_scan_type_priority() {
        assert_eq!(detect_scan_type(&fold("X-ray and CT scan")), ScanType::Xray);
        assert_eq!(detect_scan_type(&fold("CT scan, then an MRI")), ScanType::Ct);
        assert_eq!(detect_scan_type(&fold("Magnetic Resonance study")), ScanType::Mri);
        assert_eq!(detect_scan_type(&fold("abdominal sonogram")), ScanType::Ultrasound);
        assert_eq!(detect_scan_type(&fold("photograph")), ScanType::Other);
    }

    #[test]
    fn test_body_part_table_order() {
        // "chest" precedes "lung" in the table even when "lung" appears first
        assert_eq!(detect_body_part(&fold("lung fields and chest wall")), "chest");
        assert_eq!(detect_body_part(&fold("left KNEE")), "knee");
        assert_eq!(detect_body_part(&fold("nothing here")), "unknown");
    }

    #[test]
    fn test_severity_tiers() {
        assert_eq!(detect_severity(&fold("mild but severe")), SeverityLevel::Critical);
        assert_eq!(detect_severity(&fold("a significant effusion")), SeverityLevel::High);
        assert_eq!(detect_severity(&fold("Moderate narrowing")), SeverityLevel::Medium);
        assert_eq!(detect_severity(&fold("minimal change")), SeverityLevel::Low);
        assert_eq!(detect_severity(&fold("unremarkable")), SeverityLevel::Normal);
    }

    #[test]
    fn test_concerning_is_both_abnormal_and_high() {
        let signals = SignalExtractor::new().extract("A concerning shadow in the liver");
        assert!(signals.abnormalities_detected);
        assert_eq!(signals.severity, SeverityLevel::High);
        assert_eq!(signals.findings[0].area, "liver");
    }

    #[test]
    fn test_synthesized_finding() {
        let text = "Chest X-ray. Findings: a mild lesion in the right lower lobe. No effusion.";
        let signals = SignalExtractor::new().extract(text);

        assert!(signals.abnormalities_detected);
        assert_eq!(signals.scan_type, ScanType::Xray);
        assert_eq!(signals.findings.len(), 1);
        let finding = &signals.findings[0];
        assert_eq!(finding.area, "chest");
        assert_eq!(finding.confidence, 0.9);
        assert_eq!(finding.severity, SeverityLevel::Low);
        assert_eq!(
            finding.description,
            "Findings: a mild lesion in the right lower lobe."
        );
    }

    #[test]
    fn test_excerpt_without_anchor() {
        assert_eq!(main_finding_excerpt("Short text"), "Short text...");
        let long = "a".repeat(400);
        assert_eq!(main_finding_excerpt(&long), format!("{}...", "a".repeat(300)));
    }

    #[test]
    fn test_excerpt_window_without_sentence_end() {
        let text = format!("Impression {}", "x".repeat(500));
        let excerpt = main_finding_excerpt(&text);
        assert_eq!(excerpt.chars().count(), 300);
        assert!(excerpt.starts_with("Impression"));
    }

    #[test]
    fn test_excerpt_anchor_priority() {
        let text = "Impression: stable. Observation: small cyst. Rest normal";
        assert_eq!(main_finding_excerpt(text), "Observation: small cyst.");
    }
}
