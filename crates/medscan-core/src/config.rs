//! Analysis configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Fixed metadata stamped onto synthesized results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Model name recorded on each result (default: "llama-3.2-vision")
    pub ai_model: String,

    /// Result-level confidence: confidence in running the pipeline,
    /// not diagnostic certainty (default: 0.95)
    pub result_confidence: f64,

    /// Confidence assigned to a synthesized finding (default: 0.9)
    pub finding_confidence: f64,

    /// Triage priority when abnormalities are detected (default: 7)
    pub abnormal_triage_priority: u8,

    /// Triage priority otherwise (default: 2)
    pub normal_triage_priority: u8,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ai_model: "llama-3.2-vision".into(),
            result_confidence: 0.95,
            finding_confidence: 0.9,
            abnormal_triage_priority: 7,
            normal_triage_priority: 2,
        }
    }
}

impl AnalysisConfig {
    /// Parse from JSON; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid analysis config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("result_confidence", self.result_confidence),
            ("finding_confidence", self.finding_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be within [0, 1], got {}", name, value);
            }
        }
        for (name, value) in [
            ("abnormal_triage_priority", self.abnormal_triage_priority),
            ("normal_triage_priority", self.normal_triage_priority),
        ] {
            if !(1..=10).contains(&value) {
                anyhow::bail!("{} must be within 1..=10, got {}", name, value);
            }
        }
        Ok(())
    }
}
