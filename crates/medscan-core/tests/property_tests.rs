//! Property tests for extraction, severity and comparison.

use medscan_core::analysis::{main_finding_excerpt, SignalExtractor};
use medscan_core::compare::ComparisonEngine;
use medscan_core::models::{severity, ChangeDirection, Finding, ScanResult, SeverityLevel};
use proptest::prelude::*;
use proptest::test_runner::Config;

const WORDS: &[&str] = &[
    "the", "chest", "lung", "knee", "x-ray", "CT scan", "MRI", "shows", "a", "mild", "severe",
    "lesion", "mass", "fracture", "normal", "Impression:", "Finding:", "no", "moderate", ".",
    "Recommend", "follow-up", "é", "→",
];

fn analysis_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..40).prop_map(|words| words.join(" "))
}

fn severity_level() -> impl Strategy<Value = SeverityLevel> {
    prop::sample::select(SeverityLevel::ALL.to_vec())
}

fn findings() -> impl Strategy<Value = Vec<Finding>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["lung", "knee", "brain", "liver"]),
            "[a-z ]{0,20}",
            0.0_f64..=1.0,
            severity_level(),
        ),
        0..5,
    )
    .prop_map(|items| {
        // One finding per area; duplicate areas pair with the first match
        let mut seen = Vec::new();
        items
            .into_iter()
            .filter(|(area, ..)| {
                let fresh = !seen.contains(area);
                seen.push(*area);
                fresh
            })
            .map(|(area, description, confidence, severity)| {
                Finding::new(area.to_string(), description, confidence, severity)
            })
            .collect()
    })
}

fn scan_result(id: &str, findings: Vec<Finding>) -> ScanResult {
    ScanResult {
        id: id.into(),
        scan_id: format!("scan-{}", id),
        abnormalities_detected: !findings.is_empty(),
        confidence_score: 0.95,
        ai_model: "test".into(),
        findings,
        severity: SeverityLevel::Normal,
        triage_priority: 7,
        raw_analysis: String::new(),
        processed_at: "2024-01-01T00:00:00Z".into(),
    }
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn unknown_severity_labels_rank_zero(label in "[ ]{0,2}[a-zA-Z]{1,12}[ ]{0,2}") {
        prop_assume!(!["normal", "low", "medium", "high", "critical"].contains(&label.as_str()));
        prop_assert_eq!(severity::rank(&label), 0);
        prop_assert_eq!(SeverityLevel::parse_lenient(&label), SeverityLevel::Normal);
    }

    #[test]
    fn only_exact_lowercase_labels_rank(level in severity_level(), upper in any::<bool>(), pad in any::<bool>()) {
        let mut label = if upper { level.as_str().to_uppercase() } else { level.as_str().to_string() };
        if pad {
            label = format!(" {} ", label);
        }
        let expected = if upper || pad { SeverityLevel::Normal } else { level };
        prop_assert_eq!(SeverityLevel::parse_lenient(&label), expected);
        prop_assert_eq!(severity::rank(&label), expected.rank());
    }

    #[test]
    fn finding_present_iff_abnormal(text in analysis_text()) {
        let signals = SignalExtractor::new().extract(&text);
        prop_assert!(signals.findings.len() <= 1);
        prop_assert_eq!(signals.findings.len() == 1, signals.abnormalities_detected);
        if let Some(finding) = signals.findings.first() {
            prop_assert_eq!(&finding.area, &signals.body_part);
            prop_assert_eq!(finding.severity, signals.severity);
        }
    }

    #[test]
    fn excerpt_is_bounded(text in analysis_text()) {
        prop_assert!(main_finding_excerpt(&text).chars().count() <= 303);
    }

    #[test]
    fn comparing_result_with_itself_is_stable(findings in findings()) {
        let result = scan_result("a", findings);
        let comparison = ComparisonEngine::new().compare(&result, &result);

        prop_assert_eq!(comparison.overall_change, ChangeDirection::Stable);
        prop_assert_eq!(comparison.change_percentage, 0.0);
        prop_assert!(comparison.resolved_issues.is_empty());
        prop_assert!(comparison.new_issues.is_empty());
    }

    #[test]
    fn change_percentages_are_bounded(before in findings(), after in findings()) {
        let comparison = ComparisonEngine::new()
            .compare(&scan_result("b", before), &scan_result("a", after));

        prop_assert!((0.0..=100.0).contains(&comparison.change_percentage));
        for issue in &comparison.changed_issues {
            prop_assert!((0.0..=100.0).contains(&issue.change_percentage));
        }
    }
}
