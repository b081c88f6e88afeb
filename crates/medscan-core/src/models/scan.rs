//! Scan records (one uploaded image).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Imaging modality inferred from analysis text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Xray,
    Ct,
    Mri,
    Ultrasound,
    #[default]
    Other,
}

impl ScanType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanType::Xray => "xray",
            ScanType::Ct => "ct",
            ScanType::Mri => "mri",
            ScanType::Ultrasound => "ultrasound",
            ScanType::Other => "other",
        }
    }

    /// Parse a stored label; unknown labels are `Other`.
    pub fn parse(label: &str) -> Self {
        match label {
            "xray" => ScanType::Xray,
            "ct" => ScanType::Ct,
            "mri" => ScanType::Mri,
            "ultrasound" => ScanType::Ultrasound,
            _ => ScanType::Other,
        }
    }

    /// Human-readable modality name.
    pub fn display_name(self) -> &'static str {
        match self {
            ScanType::Xray => "X-ray",
            ScanType::Ct => "CT scan",
            ScanType::Mri => "MRI",
            ScanType::Ultrasound => "Ultrasound",
            ScanType::Other => "Imaging study",
        }
    }
}

/// Analysis lifecycle of a scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScanStatus {
    /// Image stored, not yet analyzed
    Uploaded,
    /// Vision analysis in flight
    Analyzing,
    /// At least one result stored
    Analyzed,
    /// Last analysis attempt failed
    Failed,
}

impl ScanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Uploaded => "uploaded",
            ScanStatus::Analyzing => "analyzing",
            ScanStatus::Analyzed => "analyzed",
            ScanStatus::Failed => "failed",
        }
    }
}

/// An uploaded scan image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scan {
    /// Unique scan ID
    pub id: String,
    /// Owning patient
    pub patient_id: String,
    /// Original upload file name
    pub file_name: String,
    /// SHA-256 of the image bytes (hex)
    pub content_hash: String,
    /// Modality (filled in after analysis)
    pub scan_type: ScanType,
    /// Body part (filled in after analysis)
    pub body_part: String,
    /// Lifecycle status
    pub status: ScanStatus,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Scan {
    /// Create a new scan record for an uploaded image.
    pub fn new(patient_id: String, file_name: String, image: &[u8]) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            file_name,
            content_hash: content_hash(image),
            scan_type: ScanType::Other,
            body_part: "unknown".into(),
            status: ScanStatus::Uploaded,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

/// Hex SHA-256 of image bytes.
pub fn content_hash(image: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image);
    hex::encode(hasher.finalize())
}
