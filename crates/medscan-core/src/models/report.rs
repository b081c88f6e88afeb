//! Report records derived from a scan result.

use serde::{Deserialize, Serialize};

/// A generated report. Reports are versioned per scan result: regenerating
/// produces a new version and supersedes the previous active one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Unique report ID
    pub id: String,
    /// Source scan result
    pub scan_result_id: String,
    /// Version number, starting at 1
    pub version: u32,
    /// Plain-language summary
    pub patient_summary: String,
    /// Excerpted clinical details
    pub clinical_details: String,
    /// Recommendation text
    pub recommendations: String,
    /// ID of the report that replaced this one, if any
    pub superseded_by: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Report {
    /// Create the first version of a report.
    pub fn new(
        scan_result_id: String,
        patient_summary: String,
        clinical_details: String,
        recommendations: String,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            scan_result_id,
            version: 1,
            patient_summary,
            clinical_details,
            recommendations,
            superseded_by: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether this is the active version.
    pub fn is_active(&self) -> bool {
        self.superseded_by.is_none()
    }
}
