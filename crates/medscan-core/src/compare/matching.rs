//! Strategies for pairing findings across two analyses by area label.
//!
//! `ExactArea` is the default. The others are opt-in.

use strsim::jaro_winkler;

/// Decides whether a before-area and an after-area refer to the same region.
pub trait AreaMatcher: Send + Sync {
    fn matches(&self, before: &str, after: &str) -> bool;
}

/// Byte-for-byte equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactArea;

impl AreaMatcher for ExactArea {
    fn matches(&self, before: &str, after: &str) -> bool {
        before == after
    }
}

/// Equality after trimming and lowercasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedArea;

impl AreaMatcher for NormalizedArea {
    fn matches(&self, before: &str, after: &str) -> bool {
        normalize(before) == normalize(after)
    }
}

/// Jaro-Winkler similarity on normalized labels.
#[derive(Debug, Clone, Copy)]
pub struct SimilarArea {
    /// Minimum similarity (0.0 - 1.0)
    pub threshold: f64,
}

impl Default for SimilarArea {
    fn default() -> Self {
        Self { threshold: 0.9 }
    }
}

impl AreaMatcher for SimilarArea {
    fn matches(&self, before: &str, after: &str) -> bool {
        jaro_winkler(&normalize(before), &normalize(after)) >= self.threshold
    }
}

fn normalize(area: &str) -> String {
    area.trim().to_lowercase()
}
