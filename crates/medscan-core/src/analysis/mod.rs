//! Analysis pipeline for vision-model output.
//!
//! Pipeline: Raw Text → Signal Extraction → Result Synthesis → Report Text

mod extractor;
pub mod report_text;
mod synthesizer;
mod text;

pub use extractor::*;
pub use report_text::{clinical_details, generate_report, patient_summary, recommendations};
pub use synthesizer::*;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::models::{ScanResult, ScanType};

/// Output of one analysis run: the stored result plus the scan metadata
/// inferred along the way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisOutcome {
    pub result: ScanResult,
    pub scan_type: ScanType,
    pub body_part: String,
}

/// Coordinates extraction and synthesis.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    extractor: SignalExtractor,
    synthesizer: ResultSynthesizer,
}

impl Analyzer {
    /// Create an analyzer from configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            extractor: SignalExtractor::from_config(&config),
            synthesizer: ResultSynthesizer::new(config),
        }
    }

    /// Turn raw analysis text for a scan into a structured result.
    pub fn analyze(&self, scan_id: &str, analysis_text: &str) -> AnalysisOutcome {
        // Step 1: Extract keyword signals
        let signals = self.extractor.extract(analysis_text);
        let scan_type = signals.scan_type;
        let body_part = signals.body_part.clone();

        // Step 2: Wrap into an immutable result
        let result = self.synthesizer.synthesize(scan_id, analysis_text, signals);

        tracing::debug!(
            "Scan {} analyzed: type={}, body_part={}, abnormal={}, severity={}",
            scan_id,
            scan_type.as_str(),
            body_part,
            result.abnormalities_detected,
            result.severity
        );

        AnalysisOutcome {
            result,
            scan_type,
            body_part,
        }
    }

    /// Get the extractor for direct access.
    pub fn extractor(&self) -> &SignalExtractor {
        &self.extractor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeverityLevel;

    #[test]
    fn test_analyze_full_pipeline() {
        let analyzer = Analyzer::default();
        let text = "Knee X-ray demonstrates a fracture of the tibial plateau. Impression: significant injury.";

        let outcome = analyzer.analyze("scan-1", text);

        assert_eq!(outcome.scan_type, ScanType::Xray);
        assert_eq!(outcome.body_part, "knee");
        assert_eq!(outcome.result.severity, SeverityLevel::High);
        assert_eq!(outcome.result.findings[0].area, "knee");
        assert_eq!(
            outcome.result.findings[0].description,
            "Impression: significant injury."
        );
    }
}
