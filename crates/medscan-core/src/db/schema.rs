//! SQLite schema definition.

/// Complete database schema for medscan.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Scans (one uploaded image each)
-- ============================================================================

CREATE TABLE IF NOT EXISTS scans (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,
    file_name TEXT NOT NULL,
    content_hash TEXT NOT NULL,                  -- SHA-256 hex of image bytes
    scan_type TEXT NOT NULL DEFAULT 'other',     -- xray, ct, mri, ultrasound, other
    body_part TEXT NOT NULL DEFAULT 'unknown',
    status TEXT NOT NULL DEFAULT 'uploaded'
        CHECK (status IN ('uploaded', 'analyzing', 'analyzed', 'failed')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_scans_patient ON scans(patient_id);
CREATE INDEX IF NOT EXISTS idx_scans_hash ON scans(content_hash);

-- ============================================================================
-- Scan Results (Immutable - a new analysis inserts a new row)
-- ============================================================================

CREATE TABLE IF NOT EXISTS scan_results (
    id TEXT PRIMARY KEY,
    scan_id TEXT NOT NULL REFERENCES scans(id),
    abnormalities_detected INTEGER NOT NULL,
    confidence_score REAL NOT NULL,
    ai_model TEXT NOT NULL,
    findings TEXT NOT NULL DEFAULT '[]',         -- JSON array of Finding
    severity TEXT NOT NULL DEFAULT 'normal',
    triage_priority INTEGER NOT NULL CHECK (triage_priority BETWEEN 1 AND 10),
    raw_analysis TEXT NOT NULL,
    processed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_results_scan ON scan_results(scan_id, processed_at);

CREATE TRIGGER IF NOT EXISTS scan_results_immutable BEFORE UPDATE ON scan_results
BEGIN
    SELECT RAISE(ABORT, 'Scan results are immutable');
END;

-- ============================================================================
-- Reports (Versioned - regeneration supersedes the active version)
-- ============================================================================

CREATE TABLE IF NOT EXISTS reports (
    id TEXT PRIMARY KEY,
    scan_result_id TEXT NOT NULL REFERENCES scan_results(id),
    version INTEGER NOT NULL CHECK (version >= 1),
    patient_summary TEXT NOT NULL,
    clinical_details TEXT NOT NULL,
    recommendations TEXT NOT NULL,
    superseded_by TEXT REFERENCES reports(id) DEFERRABLE INITIALLY DEFERRED,  -- NULL while active
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (scan_result_id, version)
);

-- At most one active report per scan result
CREATE UNIQUE INDEX IF NOT EXISTS idx_reports_active
    ON reports(scan_result_id) WHERE superseded_by IS NULL;
"#;
