//! Golden tests for keyword signal extraction and report text.
//!
//! These tests pin the extractor's behavior on representative analysis texts.

use medscan_core::analysis::report_text::{
    clinical_details, generate_report, recommendations, severity_template, NO_CLINICAL_DETAILS,
    ROUTINE_RECOMMENDATION,
};
use medscan_core::analysis::{Analyzer, SignalExtractor};
use medscan_core::models::{ScanType, SeverityLevel};

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    text: &'static str,
    expected_scan_type: ScanType,
    expected_body_part: &'static str,
    expected_abnormal: bool,
    expected_severity: SeverityLevel,
    expected_description: Option<&'static str>,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "xray-before-ct",
            text: "X-ray shows chest; CT scan pending",
            expected_scan_type: ScanType::Xray,
            expected_body_part: "chest",
            expected_abnormal: false,
            expected_severity: SeverityLevel::Normal,
            expected_description: None,
        },
        GoldenCase {
            id: "negation-is-not-handled",
            text: "No abnormality was detected, patient is healthy.",
            expected_scan_type: ScanType::Other,
            expected_body_part: "unknown",
            expected_abnormal: true,
            expected_severity: SeverityLevel::Normal,
            expected_description: Some("abnormality was detected, patient is healthy."),
        },
        GoldenCase {
            id: "knee-fracture-impression",
            text: "Knee X-ray demonstrates a fracture of the tibial plateau. Impression: significant injury.",
            expected_scan_type: ScanType::Xray,
            expected_body_part: "knee",
            expected_abnormal: true,
            expected_severity: SeverityLevel::High,
            expected_description: Some("Impression: significant injury."),
        },
        GoldenCase {
            id: "brain-mri-critical",
            text: "MRI of the brain reveals a large mass with severe midline shift. Finding: urgent.",
            expected_scan_type: ScanType::Mri,
            expected_body_part: "brain",
            expected_abnormal: true,
            expected_severity: SeverityLevel::Critical,
            expected_description: Some("Finding: urgent."),
        },
        GoldenCase {
            id: "chest-ct-no-anchor",
            text: "CT scan of the chest: moderate inflammation in the lower lung.",
            expected_scan_type: ScanType::Ct,
            expected_body_part: "chest",
            expected_abnormal: true,
            expected_severity: SeverityLevel::Medium,
            expected_description: Some("CT scan of the chest: moderate inflammation in the lower lung...."),
        },
        GoldenCase {
            id: "hyphenated-high-severity",
            text: "Sonogram of the liver shows a high-severity lesion.",
            expected_scan_type: ScanType::Ultrasound,
            expected_body_part: "liver",
            expected_abnormal: true,
            expected_severity: SeverityLevel::High,
            expected_description: Some("Sonogram of the liver shows a high-severity lesion...."),
        },
        GoldenCase {
            id: "ultrasound-normal",
            text: "Ultrasound of the kidney. Normal appearance.",
            expected_scan_type: ScanType::Ultrasound,
            expected_body_part: "kidney",
            expected_abnormal: false,
            expected_severity: SeverityLevel::Normal,
            expected_description: None,
        },
        GoldenCase {
            id: "nothing-recognized",
            text: "Image quality is poor.",
            expected_scan_type: ScanType::Other,
            expected_body_part: "unknown",
            expected_abnormal: false,
            expected_severity: SeverityLevel::Normal,
            expected_description: None,
        },
    ]
}

#[test]
fn test_golden_cases() {
    let extractor = SignalExtractor::new();

    for case in get_golden_cases() {
        let signals = extractor.extract(case.text);

        assert_eq!(
            signals.scan_type, case.expected_scan_type,
            "Case {}: scan type mismatch", case.id
        );
        assert_eq!(
            signals.body_part, case.expected_body_part,
            "Case {}: body part mismatch", case.id
        );
        assert_eq!(
            signals.abnormalities_detected, case.expected_abnormal,
            "Case {}: abnormality mismatch", case.id
        );
        assert_eq!(
            signals.severity, case.expected_severity,
            "Case {}: severity mismatch", case.id
        );
        assert_eq!(
            signals.findings.first().map(|f| f.description.as_str()),
            case.expected_description,
            "Case {}: description mismatch", case.id
        );

        if let Some(finding) = signals.findings.first() {
            assert_eq!(finding.area, case.expected_body_part, "Case {}: area mismatch", case.id);
            assert_eq!(finding.severity, case.expected_severity, "Case {}: finding severity", case.id);
            assert!((finding.confidence - 0.9).abs() < 1e-9, "Case {}: confidence", case.id);
        }
    }
}

#[test]
fn test_triage_is_binary_on_abnormality() {
    let analyzer = Analyzer::default();

    // Critical wording without an abnormality keyword still triages as normal
    let calm = analyzer.analyze("s1", "Severe motion artifact, chest X-ray.");
    assert_eq!(calm.result.severity, SeverityLevel::Critical);
    assert!(!calm.result.abnormalities_detected);
    assert_eq!(calm.result.triage_priority, 2);

    let mild = analyzer.analyze("s2", "Mild lesion in the shoulder.");
    assert_eq!(mild.result.severity, SeverityLevel::Low);
    assert_eq!(mild.result.triage_priority, 7);
}

#[test]
fn test_long_excerpt_is_capped() {
    let text = format!("Findings: lesion {}", "x".repeat(400));
    let signals = SignalExtractor::new().extract(&text);
    assert_eq!(signals.findings[0].description.chars().count(), 300);
}

#[test]
fn test_clinical_details_fallbacks() {
    assert_eq!(clinical_details(""), NO_CLINICAL_DETAILS);

    let short = "Image quality is poor.";
    assert_eq!(clinical_details(short), "Image quality is poor....");
}

#[test]
fn test_clinical_details_window() {
    let text = format!("{}Assessment: small effusion.", "x".repeat(80));
    let details = clinical_details(&text);

    assert!(details.starts_with(&"x".repeat(50)));
    assert!(details.ends_with("Assessment: small effusion."));
    assert_eq!(details.chars().count(), 50 + "Assessment: small effusion.".len());
}

#[test]
fn test_recommendations() {
    let analyzer = Analyzer::default();

    // No abnormality: always routine, even with a recommendation sentence
    let normal = analyzer.analyze("s1", "Normal chest X-ray. Recommend annual screening.");
    assert_eq!(recommendations(&normal.result.raw_analysis, &normal.result), ROUTINE_RECOMMENDATION);

    let with_sentence = analyzer.analyze(
        "s2",
        "Chest CT scan shows a mass. We recommend a biopsy within a week. Impression: suspicious.",
    );
    assert_eq!(
        recommendations(&with_sentence.result.raw_analysis, &with_sentence.result),
        "We recommend a biopsy within a week."
    );

    let templated = analyzer.analyze("s3", "Severe fracture of the wrist");
    assert_eq!(
        recommendations(&templated.result.raw_analysis, &templated.result),
        severity_template(SeverityLevel::Critical)
    );
}

#[test]
fn test_generate_report_for_result() {
    let outcome = Analyzer::default().analyze(
        "scan-1",
        "MRI of the spine. Findings: degenerative disc disease at L4-L5. Recommend physiotherapy.",
    );
    let report = generate_report(&outcome.result);

    assert_eq!(report.scan_result_id, outcome.result.id);
    assert_eq!(report.version, 1);
    assert!(report.is_active());
    assert!(report.clinical_details.contains("Findings: degenerative disc disease"));
    assert_eq!(report.recommendations, "Recommend physiotherapy.");
    assert!(report.patient_summary.contains("Primary area of concern: spine."));
}
