//! Wraps extracted signals into a `ScanResult`.

use crate::config::AnalysisConfig;
use crate::models::ScanResult;

use super::extractor::ExtractedSignals;

/// Builds scan results with fixed pipeline metadata.
#[derive(Debug, Clone)]
pub struct ResultSynthesizer {
    config: AnalysisConfig,
}

impl Default for ResultSynthesizer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl ResultSynthesizer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Build a result for `scan_id`. Always succeeds.
    ///
    /// Triage priority is binary on abnormality presence, not a function of
    /// severity.
    pub fn synthesize(&self, scan_id: &str, raw_analysis: &str, signals: ExtractedSignals) -> ScanResult {
        let triage_priority = if signals.abnormalities_detected {
            self.config.abnormal_triage_priority
        } else {
            self.config.normal_triage_priority
        };

        ScanResult {
            id: uuid::Uuid::new_v4().to_string(),
            scan_id: scan_id.to_string(),
            abnormalities_detected: signals.abnormalities_detected,
            confidence_score: self.config.result_confidence,
            ai_model: self.config.ai_model.clone(),
            findings: signals.findings,
            severity: signals.severity,
            triage_priority,
            raw_analysis: raw_analysis.to_string(),
            processed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
