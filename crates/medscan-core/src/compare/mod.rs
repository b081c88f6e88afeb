//! Before/after comparison of analyzed scans.
//!
//! Pipeline: Partition by Area → Classify Pairs → Score Intensity → Aggregate → Summarize

mod engine;
mod matching;

pub use engine::*;
pub use matching::*;

use thiserror::Error;

/// Comparison errors.
#[derive(Error, Debug, PartialEq)]
pub enum ComparisonError {
    #[error("Both scans must be analyzed before comparing (missing {0} result)")]
    MissingAnalysis(String),
}

pub type CompareResult<T> = Result<T, ComparisonError>;
