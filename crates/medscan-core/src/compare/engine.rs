//! Finding-level diff between two scan results.
//!
//! Change intensity weights:
//! - Severity rank delta: 50%
//! - Confidence delta: 30%
//! - Description changed: 20%

use crate::models::{
    ChangeDirection, ChangeFactors, ChangedIssue, ComparisonResult, Finding, ScanResult,
    SeverityLevel,
};

use super::matching::{AreaMatcher, ExactArea};
use super::{ComparisonError, CompareResult};

const SEVERITY_WEIGHT: f64 = 0.5;
const CONFIDENCE_WEIGHT: f64 = 0.3;
const DESCRIPTION_WEIGHT: f64 = 0.2;

/// Description factor when the text differs at all.
const DESCRIPTION_CHANGED: f64 = 0.5;

/// Compares a before/after pair of results.
pub struct ComparisonEngine {
    matcher: Box<dyn AreaMatcher>,
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonEngine {
    /// Engine with exact area matching.
    pub fn new() -> Self {
        Self::with_matcher(Box::new(ExactArea))
    }

    /// Engine with a custom area-matching strategy.
    pub fn with_matcher(matcher: Box<dyn AreaMatcher>) -> Self {
        Self { matcher }
    }

    /// Compare two optional results; both must be present.
    pub fn compare_analyzed(
        &self,
        before: Option<&ScanResult>,
        after: Option<&ScanResult>,
    ) -> CompareResult<ComparisonResult> {
        match (before, after) {
            (Some(before), Some(after)) => Ok(self.compare(before, after)),
            (None, _) => Err(ComparisonError::MissingAnalysis("before".into())),
            (_, None) => Err(ComparisonError::MissingAnalysis("after".into())),
        }
    }

    /// Compare two results.
    pub fn compare(&self, before: &ScanResult, after: &ScanResult) -> ComparisonResult {
        // 1. Partition by area membership
        let resolved_issues: Vec<Finding> = before
            .findings
            .iter()
            .filter(|b| !after.findings.iter().any(|a| self.matcher.matches(&b.area, &a.area)))
            .cloned()
            .collect();

        let new_issues: Vec<Finding> = after
            .findings
            .iter()
            .filter(|a| !before.findings.iter().any(|b| self.matcher.matches(&b.area, &a.area)))
            .cloned()
            .collect();

        // 2. Classify and score each matched pair
        let changed_issues: Vec<ChangedIssue> = before
            .findings
            .iter()
            .filter_map(|b| {
                after
                    .findings
                    .iter()
                    .find(|a| self.matcher.matches(&b.area, &a.area))
                    .map(|a| compare_pair(b, a))
            })
            .collect();

        // 3. Aggregate score
        let improved = count(&changed_issues, ChangeDirection::Improved);
        let worsened = count(&changed_issues, ChangeDirection::Worsened) + new_issues.len();
        let total_issues = before.findings.len().max(1);
        let improvement_score =
            ((resolved_issues.len() + improved) as f64 - worsened as f64) / total_issues as f64;
        let change_percentage = (improvement_score.abs() * 100.0).min(100.0);

        let overall_change = if improvement_score > 0.0 {
            ChangeDirection::Improved
        } else if improvement_score < 0.0 {
            ChangeDirection::Worsened
        } else {
            ChangeDirection::Stable
        };

        tracing::debug!(
            "Comparison {} -> {}: {} (score {:.2}, resolved={}, new={}, matched={})",
            before.id,
            after.id,
            overall_change.as_str(),
            improvement_score,
            resolved_issues.len(),
            new_issues.len(),
            changed_issues.len()
        );

        let counts = ChangeCounts {
            resolved: resolved_issues.len(),
            improved,
            new: new_issues.len(),
            worsened_matched: count(&changed_issues, ChangeDirection::Worsened),
        };

        ComparisonResult {
            overall_change,
            change_percentage,
            summary: summarize(overall_change, &counts, before.severity, after.severity),
            recommendations: recommend(overall_change, &counts, after.severity),
            resolved_issues,
            new_issues,
            changed_issues,
        }
    }
}

/// Classify and score one matched pair.
pub fn compare_pair(before: &Finding, after: &Finding) -> ChangedIssue {
    let delta = SeverityLevel::delta(before.severity, after.severity);
    let change = match delta {
        d if d < 0 => ChangeDirection::Improved,
        d if d > 0 => ChangeDirection::Worsened,
        _ => ChangeDirection::Stable,
    };

    let severity_factor = f64::from(delta.unsigned_abs()) / f64::from(SeverityLevel::MAX_RANK_DELTA);
    let confidence_factor = (after.confidence - before.confidence).abs();
    let description_factor = if before.description == after.description {
        0.0
    } else {
        DESCRIPTION_CHANGED
    };

    let weighted = severity_factor * SEVERITY_WEIGHT
        + confidence_factor * CONFIDENCE_WEIGHT
        + description_factor * DESCRIPTION_WEIGHT;

    ChangedIssue {
        area: before.area.clone(),
        before: before.clone(),
        after: after.clone(),
        change,
        change_percentage: (weighted * 100.0).round().clamp(0.0, 100.0),
        change_factors: ChangeFactors {
            severity_change: (severity_factor * 100.0).round(),
            confidence_change: (confidence_factor * 100.0).round(),
            description_change: (description_factor * 100.0).round(),
        },
    }
}

fn count(issues: &[ChangedIssue], direction: ChangeDirection) -> usize {
    issues.iter().filter(|i| i.change == direction).count()
}

/// Counts feeding the summary templates.
struct ChangeCounts {
    resolved: usize,
    improved: usize,
    new: usize,
    /// Worsened matched findings (excludes new issues)
    worsened_matched: usize,
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn summarize(
    overall: ChangeDirection,
    counts: &ChangeCounts,
    before: SeverityLevel,
    after: SeverityLevel,
) -> String {
    let mut summary = match overall {
        ChangeDirection::Improved => format!(
            "Overall improvement observed. {} resolved and {} improved since the previous scan.",
            plural(counts.resolved, "issue"),
            plural(counts.improved, "finding")
        ),
        ChangeDirection::Worsened => format!(
            "Condition appears to have worsened. {} detected and {} worsened since the previous scan.",
            plural(counts.new, "new issue"),
            plural(counts.worsened_matched, "finding")
        ),
        ChangeDirection::Stable => {
            "Condition appears stable with no significant net change between scans.".to_string()
        }
    };
    summary.push_str(&format!(" Overall severity: {} (before) to {} (after).", before, after));
    summary
}

fn recommend(overall: ChangeDirection, counts: &ChangeCounts, current: SeverityLevel) -> Vec<String> {
    let mut recommendations = Vec::new();

    match overall {
        ChangeDirection::Improved => {
            recommendations.push("Continue the current treatment plan.".to_string());
            recommendations
                .push("Schedule a routine follow-up scan to confirm continued improvement.".to_string());
        }
        ChangeDirection::Worsened => {
            recommendations
                .push("Consult a specialist to review the current treatment plan.".to_string());
        }
        ChangeDirection::Stable => {
            recommendations.push("Maintain the current monitoring schedule.".to_string());
        }
    }

    if counts.new > 0 {
        recommendations.push(format!(
            "Investigate the {} further.",
            plural(counts.new, "newly detected finding")
        ));
    }

    if counts.worsened_matched > 0 {
        recommendations.push("Monitor worsening findings closely with a short-interval follow-up.".to_string());
    }

    if current.is_urgent() {
        recommendations.push(format!(
            "Current severity is {}: arrange prompt clinical review.",
            current
        ));
    }

    recommendations
}
