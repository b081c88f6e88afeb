//! Ordinal severity scale shared by every other component.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Clinical-concern level, totally ordered from `Normal` to `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SeverityLevel {
    #[default]
    Normal,
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    /// All levels in ascending order.
    pub const ALL: [SeverityLevel; 5] = [
        SeverityLevel::Normal,
        SeverityLevel::Low,
        SeverityLevel::Medium,
        SeverityLevel::High,
        SeverityLevel::Critical,
    ];

    /// Largest possible rank difference between two levels.
    pub const MAX_RANK_DELTA: u8 = 4;

    /// Ordinal rank, 0 (normal) through 4 (critical).
    pub fn rank(self) -> u8 {
        match self {
            SeverityLevel::Normal => 0,
            SeverityLevel::Low => 1,
            SeverityLevel::Medium => 2,
            SeverityLevel::High => 3,
            SeverityLevel::Critical => 4,
        }
    }

    /// Signed rank difference `after - before`.
    pub fn delta(before: SeverityLevel, after: SeverityLevel) -> i8 {
        after.rank() as i8 - before.rank() as i8
    }

    /// Lowercase label as stored and displayed.
    pub fn as_str(self) -> &'static str {
        match self {
            SeverityLevel::Normal => "normal",
            SeverityLevel::Low => "low",
            SeverityLevel::Medium => "medium",
            SeverityLevel::High => "high",
            SeverityLevel::Critical => "critical",
        }
    }

    /// Parse a severity label. Anything other than the five exact lowercase
    /// labels maps to `Normal`.
    ///
    /// Labels come from heuristic extraction and stored records, never from
    /// validated input, so this never fails.
    pub fn parse_lenient(label: &str) -> Self {
        match label {
            "low" => SeverityLevel::Low,
            "medium" => SeverityLevel::Medium,
            "high" => SeverityLevel::High,
            "critical" => SeverityLevel::Critical,
            _ => SeverityLevel::Normal,
        }
    }

    /// True for `High` and `Critical`.
    pub fn is_urgent(self) -> bool {
        self >= SeverityLevel::High
    }
}

/// Rank of a severity label; unknown labels rank as normal (0).
pub fn rank(label: &str) -> u8 {
    SeverityLevel::parse_lenient(label).rank()
}

/// Three-way comparison of two levels.
pub fn compare(a: SeverityLevel, b: SeverityLevel) -> Ordering {
    a.rank().cmp(&b.rank())
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SeverityLevel {
    fn from(label: &str) -> Self {
        SeverityLevel::parse_lenient(label)
    }
}

impl From<String> for SeverityLevel {
    fn from(label: String) -> Self {
        SeverityLevel::parse_lenient(&label)
    }
}

impl From<SeverityLevel> for String {
    fn from(level: SeverityLevel) -> Self {
        level.as_str().to_string()
    }
}
