//! Before/after comparison output (computed on demand, never persisted).

use serde::{Deserialize, Serialize};

use super::finding::Finding;

/// Direction of change between two analyses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Improved,
    Worsened,
    Stable,
}

impl ChangeDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeDirection::Improved => "improved",
            ChangeDirection::Worsened => "worsened",
            ChangeDirection::Stable => "stable",
        }
    }
}

/// Individual factors of a change-intensity score, each a percentage (0 - 100).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeFactors {
    /// Severity rank delta - weight: 50%
    pub severity_change: f64,
    /// Confidence delta - weight: 30%
    pub confidence_change: f64,
    /// Description changed (binary) - weight: 20%
    pub description_change: f64,
}

/// A finding present in both analyses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangedIssue {
    pub area: String,
    pub before: Finding,
    pub after: Finding,
    pub change: ChangeDirection,
    /// Weighted change intensity (0 - 100)
    pub change_percentage: f64,
    pub change_factors: ChangeFactors,
}

/// Diff between two scan results keyed by finding area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub overall_change: ChangeDirection,
    /// Magnitude of the aggregate improvement score (0 - 100)
    pub change_percentage: f64,
    /// Present before, absent after
    pub resolved_issues: Vec<Finding>,
    /// Absent before, present after
    pub new_issues: Vec<Finding>,
    pub changed_issues: Vec<ChangedIssue>,
    pub summary: String,
    pub recommendations: Vec<String>,
}

impl ComparisonResult {
    /// Count of matched findings with the given direction.
    pub fn changed_count(&self, direction: ChangeDirection) -> usize {
        self.changed_issues
            .iter()
            .filter(|issue| issue.change == direction)
            .count()
    }
}
