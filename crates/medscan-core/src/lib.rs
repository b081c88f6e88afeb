//! Medscan Core Library
//!
//! Local-first medical scan analysis: vision-model text in, structured
//! results, patient reports and before/after comparisons out.
//!
//! # Architecture
//!
//! ```text
//! Image upload → Scan (uploaded)
//!                    │
//!             begin_analysis ──── second call while in flight → AnalysisInProgress
//!                    │
//!          Vision model free text
//!                    │
//!     ┌──────────────▼──────────────┐
//!     │     Signal Extraction       │
//!     │  type, body part, severity  │
//!     └──────────────┬──────────────┘
//!                    │
//!          ScanResult (immutable)
//!                    │
//!        ┌───────────┴───────────┐
//!        │                       │
//!        ▼                       ▼
//!   Report (versioned)    Comparison (before, after)
//! ```
//!
//! # Core Principle
//!
//! **Analysis is keyword-based and deterministic.** The same text always
//! yields the same findings, severity and triage priority.
//!
//! # Modules
//!
//! - [`analysis`]: Signal extraction, result synthesis and report text
//! - [`compare`]: Finding-level before/after comparison
//! - [`config`]: Analysis configuration
//! - [`db`]: SQLite persistence for scans, results and reports
//! - [`models`]: Domain types (Scan, ScanResult, Finding, Report, etc.)
//! - [`validate`]: Validation of externally supplied result JSON

pub mod analysis;
pub mod compare;
pub mod config;
pub mod db;
pub mod models;
pub mod validate;

// Re-export commonly used types
pub use analysis::{AnalysisOutcome, Analyzer};
pub use compare::{AreaMatcher, ComparisonEngine, ExactArea, NormalizedArea, SimilarArea};
pub use config::AnalysisConfig;
pub use db::Database;
pub use models::{
    ChangeDirection, ChangedIssue, ComparisonResult, Finding, Report, Scan, ScanResult,
    ScanStatus, ScanType, SeverityLevel,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MedscanError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Analysis already in progress for scan {0}")]
    AnalysisInProgress(String),

    #[error("Missing analysis: {0}")]
    MissingAnalysis(String),
}

impl From<db::DbError> for MedscanError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => MedscanError::NotFound(what),
            db::DbError::NotAnalyzing(scan_id) => {
                MedscanError::InvalidInput(format!("scan {} not being analyzed", scan_id))
            }
            other => MedscanError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for MedscanError {
    fn from(e: serde_json::Error) -> Self {
        MedscanError::SerializationError(e.to_string())
    }
}

impl From<validate::ValidationError> for MedscanError {
    fn from(e: validate::ValidationError) -> Self {
        MedscanError::InvalidInput(e.to_string())
    }
}

impl From<compare::ComparisonError> for MedscanError {
    fn from(e: compare::ComparisonError) -> Self {
        match e {
            compare::ComparisonError::MissingAnalysis(which) => {
                MedscanError::MissingAnalysis(format!("{} scan has no result", which))
            }
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for MedscanError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MedscanError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
///
/// `config_json` overrides analysis defaults; missing keys keep theirs.
#[uniffi::export]
pub fn open_database(
    path: String,
    config_json: Option<String>,
) -> Result<Arc<MedscanCore>, MedscanError> {
    let db = Database::open(&path)?;
    tracing::info!("Opened medscan database at {}", path);
    MedscanCore::build(db, config_json)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory(
    config_json: Option<String>,
) -> Result<Arc<MedscanCore>, MedscanError> {
    let db = Database::open_in_memory()?;
    MedscanCore::build(db, config_json)
}

/// Install a global `tracing` subscriber.
///
/// `filter` uses env-filter syntax (e.g. "medscan_core=debug"); without it
/// `RUST_LOG` is read, falling back to "info". Repeated calls are no-ops.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> Result<(), MedscanError> {
    use tracing_subscriber::EnvFilter;

    let filter = match filter {
        Some(directives) => EnvFilter::try_new(&directives)
            .map_err(|e| MedscanError::InvalidInput(format!("log filter: {}", e)))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("Logging already initialized");
    }
    Ok(())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct MedscanCore {
    db: Arc<Mutex<Database>>,
    analyzer: Analyzer,
    comparison: ComparisonEngine,
}

impl MedscanCore {
    fn build(db: Database, config_json: Option<String>) -> Result<Arc<Self>, MedscanError> {
        let config = match config_json {
            Some(json) => AnalysisConfig::from_json_str(&json)
                .map_err(|e| MedscanError::InvalidInput(format!("{:#}", e)))?,
            None => AnalysisConfig::default(),
        };
        Ok(Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            analyzer: Analyzer::new(config),
            comparison: ComparisonEngine::new(),
        }))
    }

    fn require_scan(db: &Database, scan_id: &str) -> Result<Scan, MedscanError> {
        db.get_scan(scan_id)?
            .ok_or_else(|| MedscanError::NotFound(format!("scan {}", scan_id)))
    }

    fn require_latest_result(db: &Database, scan_id: &str) -> Result<ScanResult, MedscanError> {
        Self::require_scan(db, scan_id)?;
        db.latest_result_for_scan(scan_id)?
            .ok_or_else(|| MedscanError::MissingAnalysis(format!("scan {} has no result", scan_id)))
    }
}

#[uniffi::export]
impl MedscanCore {
    // =========================================================================
    // Scan Operations
    // =========================================================================

    /// Register an uploaded image.
    pub fn create_scan(
        &self,
        patient_id: String,
        file_name: String,
        image: Vec<u8>,
    ) -> Result<FfiScan, MedscanError> {
        if patient_id.trim().is_empty() {
            return Err(MedscanError::InvalidInput("patient_id is empty".into()));
        }
        let db = self.db.lock()?;
        let scan = Scan::new(patient_id, file_name, &image);

        let duplicates = db.find_scans_by_hash(&scan.content_hash)?;
        if !duplicates.is_empty() {
            tracing::info!(
                "Scan {} has the same image as {} existing scan(s)",
                scan.id,
                duplicates.len()
            );
        }

        db.insert_scan(&scan)?;
        Ok(scan.into())
    }

    /// Get a scan by ID.
    pub fn get_scan(&self, scan_id: String) -> Result<Option<FfiScan>, MedscanError> {
        let db = self.db.lock()?;
        let scan = db.get_scan(&scan_id)?;
        Ok(scan.map(|s| s.into()))
    }

    /// List a patient's scans, newest first.
    pub fn list_patient_scans(&self, patient_id: String) -> Result<Vec<FfiScan>, MedscanError> {
        let db = self.db.lock()?;
        let scans = db.list_scans_for_patient(&patient_id)?;
        Ok(scans.into_iter().map(|s| s.into()).collect())
    }

    // =========================================================================
    // Analysis Operations
    // =========================================================================

    /// Mark a scan as being analyzed.
    ///
    /// Fails with `AnalysisInProgress` while a previous analysis is in flight.
    pub fn begin_analysis(&self, scan_id: String) -> Result<(), MedscanError> {
        let db = self.db.lock()?;
        if !db.begin_analysis(&scan_id)? {
            tracing::warn!("Rejected analysis for scan {}: already in progress", scan_id);
            return Err(MedscanError::AnalysisInProgress(scan_id));
        }
        tracing::info!("Analysis started for scan {}", scan_id);
        Ok(())
    }

    /// Turn vision-model text into a stored result for the scan.
    ///
    /// The scan must have been passed to `begin_analysis` first.
    pub fn complete_analysis(
        &self,
        scan_id: String,
        analysis_text: String,
    ) -> Result<FfiScanResult, MedscanError> {
        let db = self.db.lock()?;
        Self::require_scan(&db, &scan_id)?;

        let outcome = self.analyzer.analyze(&scan_id, &analysis_text);
        db.record_analysis(&outcome)?;

        tracing::info!(
            "Analysis finished for scan {}: severity={}, triage={}",
            scan_id,
            outcome.result.severity,
            outcome.result.triage_priority
        );
        Ok(outcome.result.into())
    }

    /// Store a result produced elsewhere, after validation.
    pub fn import_result(&self, result_json: String) -> Result<FfiScanResult, MedscanError> {
        let result = validate::parse_scan_result(&result_json)?;
        let db = self.db.lock()?;
        Self::require_scan(&db, &result.scan_id)?;
        db.insert_result(&result)?;
        Ok(result.into())
    }

    /// Record that the in-flight analysis failed.
    pub fn fail_analysis(&self, scan_id: String, reason: String) -> Result<(), MedscanError> {
        let db = self.db.lock()?;
        db.mark_scan_failed(&scan_id)?;
        tracing::warn!("Analysis failed for scan {}: {}", scan_id, reason);
        Ok(())
    }

    /// Most recent result for a scan.
    pub fn get_latest_result(&self, scan_id: String) -> Result<Option<FfiScanResult>, MedscanError> {
        let db = self.db.lock()?;
        let result = db.latest_result_for_scan(&scan_id)?;
        Ok(result.map(|r| r.into()))
    }

    // =========================================================================
    // Report Operations
    // =========================================================================

    /// Generate a report for the scan's latest result.
    ///
    /// An existing active report for that result is superseded.
    pub fn generate_report(&self, scan_id: String) -> Result<FfiReport, MedscanError> {
        let db = self.db.lock()?;
        let result = Self::require_latest_result(&db, &scan_id)?;
        let report = db.save_report(&analysis::generate_report(&result))?;
        Ok(report.into())
    }

    /// Active report for the scan's latest result.
    pub fn get_active_report(&self, scan_id: String) -> Result<Option<FfiReport>, MedscanError> {
        let db = self.db.lock()?;
        let Some(result) = db.latest_result_for_scan(&scan_id)? else {
            return Ok(None);
        };
        let report = db.get_active_report(&result.id)?;
        Ok(report.map(|r| r.into()))
    }

    /// All report versions for the scan's latest result, oldest first.
    pub fn list_report_versions(&self, scan_id: String) -> Result<Vec<FfiReport>, MedscanError> {
        let db = self.db.lock()?;
        let Some(result) = db.latest_result_for_scan(&scan_id)? else {
            return Ok(Vec::new());
        };
        let reports = db.list_report_versions(&result.id)?;
        Ok(reports.into_iter().map(|r| r.into()).collect())
    }

    // =========================================================================
    // Comparison Operations
    // =========================================================================

    /// Compare the latest results of two scans.
    pub fn compare_scans(
        &self,
        before_scan_id: String,
        after_scan_id: String,
    ) -> Result<FfiComparison, MedscanError> {
        let db = self.db.lock()?;
        Self::require_scan(&db, &before_scan_id)?;
        Self::require_scan(&db, &after_scan_id)?;

        let before = db.latest_result_for_scan(&before_scan_id)?;
        let after = db.latest_result_for_scan(&after_scan_id)?;
        let comparison = self.comparison.compare_analyzed(before.as_ref(), after.as_ref())?;

        Ok(comparison.into())
    }

    /// Compare the latest results of two scans, as JSON.
    pub fn compare_scans_json(
        &self,
        before_scan_id: String,
        after_scan_id: String,
    ) -> Result<String, MedscanError> {
        let db = self.db.lock()?;
        Self::require_scan(&db, &before_scan_id)?;
        Self::require_scan(&db, &after_scan_id)?;

        let before = db.latest_result_for_scan(&before_scan_id)?;
        let after = db.latest_result_for_scan(&after_scan_id)?;
        let comparison = self.comparison.compare_analyzed(before.as_ref(), after.as_ref())?;

        Ok(serde_json::to_string(&comparison)?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe scan.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiScan {
    pub id: String,
    pub patient_id: String,
    pub file_name: String,
    pub content_hash: String,
    pub scan_type: String,
    pub body_part: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Scan> for FfiScan {
    fn from(scan: Scan) -> Self {
        Self {
            id: scan.id,
            patient_id: scan.patient_id,
            file_name: scan.file_name,
            content_hash: scan.content_hash,
            scan_type: scan.scan_type.as_str().to_string(),
            body_part: scan.body_part,
            status: scan.status.as_str().to_string(),
            created_at: scan.created_at,
            updated_at: scan.updated_at,
        }
    }
}

/// FFI-safe finding.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFinding {
    pub id: String,
    pub area: String,
    pub description: String,
    pub confidence: f64,
    pub severity: String,
}

impl From<Finding> for FfiFinding {
    fn from(finding: Finding) -> Self {
        Self {
            id: finding.id,
            area: finding.area,
            description: finding.description,
            confidence: finding.confidence,
            severity: finding.severity.as_str().to_string(),
        }
    }
}

/// FFI-safe scan result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiScanResult {
    pub id: String,
    pub scan_id: String,
    pub abnormalities_detected: bool,
    pub confidence_score: f64,
    pub ai_model: String,
    pub findings: Vec<FfiFinding>,
    pub severity: String,
    pub triage_priority: u8,
    pub raw_analysis: String,
    pub processed_at: String,
}

impl From<ScanResult> for FfiScanResult {
    fn from(result: ScanResult) -> Self {
        Self {
            id: result.id,
            scan_id: result.scan_id,
            abnormalities_detected: result.abnormalities_detected,
            confidence_score: result.confidence_score,
            ai_model: result.ai_model,
            findings: result.findings.into_iter().map(|f| f.into()).collect(),
            severity: result.severity.as_str().to_string(),
            triage_priority: result.triage_priority,
            raw_analysis: result.raw_analysis,
            processed_at: result.processed_at,
        }
    }
}

/// FFI-safe report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReport {
    pub id: String,
    pub scan_result_id: String,
    pub version: u32,
    pub patient_summary: String,
    pub clinical_details: String,
    pub recommendations: String,
    pub superseded_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Report> for FfiReport {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            scan_result_id: report.scan_result_id,
            version: report.version,
            patient_summary: report.patient_summary,
            clinical_details: report.clinical_details,
            recommendations: report.recommendations,
            superseded_by: report.superseded_by,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

/// FFI-safe changed finding.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiChangedIssue {
    pub area: String,
    pub before: FfiFinding,
    pub after: FfiFinding,
    pub change: String,
    pub change_percentage: f64,
    pub severity_change: f64,
    pub confidence_change: f64,
    pub description_change: f64,
}

impl From<ChangedIssue> for FfiChangedIssue {
    fn from(issue: ChangedIssue) -> Self {
        Self {
            area: issue.area,
            before: issue.before.into(),
            after: issue.after.into(),
            change: issue.change.as_str().to_string(),
            change_percentage: issue.change_percentage,
            severity_change: issue.change_factors.severity_change,
            confidence_change: issue.change_factors.confidence_change,
            description_change: issue.change_factors.description_change,
        }
    }
}

/// FFI-safe comparison.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiComparison {
    pub overall_change: String,
    pub change_percentage: f64,
    pub resolved_issues: Vec<FfiFinding>,
    pub new_issues: Vec<FfiFinding>,
    pub changed_issues: Vec<FfiChangedIssue>,
    pub summary: String,
    pub recommendations: Vec<String>,
}

impl From<ComparisonResult> for FfiComparison {
    fn from(comparison: ComparisonResult) -> Self {
        Self {
            overall_change: comparison.overall_change.as_str().to_string(),
            change_percentage: comparison.change_percentage,
            resolved_issues: comparison.resolved_issues.into_iter().map(|f| f.into()).collect(),
            new_issues: comparison.new_issues.into_iter().map(|f| f.into()).collect(),
            changed_issues: comparison.changed_issues.into_iter().map(|i| i.into()).collect(),
            summary: comparison.summary,
            recommendations: comparison.recommendations,
        }
    }
}
