//! Report text derived from raw analysis and its structured result.

use crate::models::{Report, ScanResult, SeverityLevel};

use super::text::{char_offset, find_first, fold, head_chars, slice_chars};

/// Clinical details when the raw analysis is empty.
pub const NO_CLINICAL_DETAILS: &str = "No clinical details available.";

/// Recommendation whenever no abnormality was detected.
pub const ROUTINE_RECOMMENDATION: &str = "No abnormalities detected. Routine follow-up as needed.";

const CLINICAL_ANCHORS: &[&str] = &["clinical", "diagnosis", "assessment", "findings", "observation"];

const RECOMMENDATION_ANCHORS: &[&str] = &["recommend", "follow-up", "follow up", "advised", "suggest"];

/// Chars kept before / after a clinical anchor.
const CONTEXT_BEFORE: usize = 50;
const CONTEXT_AFTER: usize = 350;

/// Chars kept when no clinical anchor exists.
const HEAD_CHARS: usize = 300;

/// Clinical-details excerpt.
///
/// A window from 50 chars before the first anchor to 350 chars after it,
/// otherwise the first 300 chars with an ellipsis.
pub fn clinical_details(raw_analysis: &str) -> String {
    if raw_analysis.is_empty() {
        return NO_CLINICAL_DETAILS.to_string();
    }

    let folded = fold(raw_analysis);
    match find_first(&folded, CLINICAL_ANCHORS) {
        Some((idx, _)) => {
            let at = char_offset(raw_analysis, idx);
            let start = at.saturating_sub(CONTEXT_BEFORE);
            slice_chars(raw_analysis, start, at + CONTEXT_AFTER).to_string()
        }
        None => format!("{}...", head_chars(raw_analysis, HEAD_CHARS)),
    }
}

/// Recommendation text.
///
/// Without abnormalities this is always the routine recommendation. Otherwise
/// the first sentence carrying a recommendation anchor, falling back to a
/// severity template.
pub fn recommendations(raw_analysis: &str, result: &ScanResult) -> String {
    if !result.abnormalities_detected {
        return ROUTINE_RECOMMENDATION.to_string();
    }

    let folded = fold(raw_analysis);
    RECOMMENDATION_ANCHORS
        .iter()
        .filter_map(|anchor| folded.find(anchor))
        .find_map(|idx| sentence_around(raw_analysis, idx))
        .map(str::to_string)
        .unwrap_or_else(|| severity_template(result.severity).to_string())
}

/// Sentence containing byte `idx`: from after the preceding period through
/// the next period. `None` when there is no closing period.
fn sentence_around(text: &str, idx: usize) -> Option<&str> {
    let start = text[..idx].rfind('.').map(|p| p + 1).unwrap_or(0);
    let end = text[idx..].find('.').map(|p| idx + p + 1).unwrap_or(0);
    if end > start {
        Some(text[start..end].trim())
    } else {
        None
    }
}

/// Fallback recommendation keyed by overall severity.
pub fn severity_template(severity: SeverityLevel) -> &'static str {
    match severity {
        SeverityLevel::Critical => {
            "Immediate specialist consultation required. Further diagnostic imaging may be necessary."
        }
        SeverityLevel::High => {
            "Urgent follow-up recommended within 1-2 days. Consider additional diagnostic tests."
        }
        SeverityLevel::Medium => {
            "Follow-up recommended within 1-2 weeks. Monitor for changes in symptoms."
        }
        _ => "Follow-up at next routine visit. No immediate action required.",
    }
}

/// Plain-language summary for the patient-facing section.
pub fn patient_summary(result: &ScanResult) -> String {
    if !result.abnormalities_detected {
        return format!(
            "No abnormalities were detected in this analysis. Overall severity: {}. Triage priority {}/10.",
            result.severity, result.triage_priority
        );
    }

    let count = result.findings.len();
    let mut summary = format!(
        "The analysis identified {} finding{} with {} overall severity. Triage priority {}/10.",
        count,
        if count == 1 { "" } else { "s" },
        result.severity,
        result.triage_priority
    );
    if let Some(first) = result.findings.first() {
        summary.push_str(&format!(" Primary area of concern: {}.", first.area));
    }
    summary
}

/// Build the first version of a report for a result.
pub fn generate_report(result: &ScanResult) -> Report {
    Report::new(
        result.id.clone(),
        patient_summary(result),
        clinical_details(&result.raw_analysis),
        recommendations(&result.raw_analysis, result),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Finding;

    fn make_result(abnormal: bool, severity: SeverityLevel, raw: &str) -> ScanResult {
        let findings = if abnormal {
            vec![Finding::new("lung".into(), "nodule".into(), 0.9, severity)]
        } else {
            vec![]
        };
        ScanResult {
            id: "result-1".into(),
            scan_id: "scan-1".into(),
            abnormalities_detected: abnormal,
            confidence_score: 0.95,
            ai_model: "test".into(),
            findings,
            severity,
            triage_priority: if abnormal { 7 } else { 2 },
            raw_analysis: raw.into(),
            processed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_clinical_details_empty() {
        assert_eq!(clinical_details(""), NO_CLINICAL_DETAILS);
    }

    #[test]
    fn test_clinical_details_window() {
        let prefix = "p".repeat(80);
        let suffix = "s".repeat(500);
        let text = format!("{}Diagnosis{}", prefix, suffix);
        let details = clinical_details(&text);

        assert_eq!(details.chars().count(), 400);
        assert!(details.starts_with(&"p".repeat(50)));
        assert_eq!(&details[50..59], "Diagnosis");
    }

    #[test]
    fn test_clinical_details_near_start() {
        let text = "Assessment: stable appearance.";
        assert_eq!(clinical_details(text), text);
    }

    #[test]
    fn test_clinical_details_no_anchor() {
        assert_eq!(clinical_details("Plain text"), "Plain text...");
    }

    #[test]
    fn test_recommendation_sentence() {
        let raw = "There is a lesion. We recommend a biopsy within two weeks. Otherwise stable.";
        let result = make_result(true, SeverityLevel::Medium, raw);
        assert_eq!(
            recommendations(raw, &result),
            "We recommend a biopsy within two weeks."
        );
    }

    #[test]
    fn test_recommendation_falls_through_anchors() {
        // "recommend" has no closing period; "advised" does
        let raw = "Patient advised to rest. Recommend repeat imaging";
        let result = make_result(true, SeverityLevel::High, raw);
        assert_eq!(recommendations(raw, &result), "Patient advised to rest.");
    }

    #[test]
    fn test_recommendation_templates() {
        let raw = "Lesion noted";
        let cases = [
            (SeverityLevel::Critical, "Immediate specialist consultation required."),
            (SeverityLevel::High, "Urgent follow-up recommended within 1-2 days."),
            (SeverityLevel::Medium, "Follow-up recommended within 1-2 weeks."),
            (SeverityLevel::Low, "Follow-up at next routine visit."),
            (SeverityLevel::Normal, "Follow-up at next routine visit."),
        ];
        for (severity, prefix) in cases {
            let result = make_result(true, severity, raw);
            assert!(
                recommendations(raw, &result).starts_with(prefix),
                "severity {} should use template starting with {}",
                severity,
                prefix
            );
        }
    }

    #[test]
    fn test_no_abnormality_ignores_keywords() {
        let raw = "We strongly recommend surgery. Follow-up tomorrow.";
        let result = make_result(false, SeverityLevel::Normal, raw);
        assert_eq!(recommendations(raw, &result), ROUTINE_RECOMMENDATION);
    }

    #[test]
    fn test_patient_summary() {
        let result = make_result(true, SeverityLevel::High, "x");
        let summary = patient_summary(&result);
        assert!(summary.contains("1 finding with high overall severity"));
        assert!(summary.contains("Primary area of concern: lung."));

        let normal = make_result(false, SeverityLevel::Normal, "x");
        assert!(patient_summary(&normal).starts_with("No abnormalities"));
    }

    #[test]
    fn test_generate_report() {
        let raw = "Findings: small mass. Suggest CT follow-up.";
        let result = make_result(true, SeverityLevel::Low, raw);
        let report = generate_report(&result);

        assert_eq!(report.scan_result_id, "result-1");
        assert_eq!(report.version, 1);
        assert_eq!(report.clinical_details, raw);
        assert_eq!(report.recommendations, "Suggest CT follow-up.");
    }
}
