//! Scan result database operations (insert-only).

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::analysis::AnalysisOutcome;
use crate::models::{Finding, ScanResult, SeverityLevel};

const RESULT_COLUMNS: &str = r#"
    id, scan_id, abnormalities_detected, confidence_score, ai_model,
    findings, severity, triage_priority, raw_analysis, processed_at
"#;

impl Database {
    /// Insert a new scan result.
    pub fn insert_result(&self, result: &ScanResult) -> DbResult<()> {
        let findings_json = serde_json::to_string(&result.findings)?;

        self.conn.execute(
            r#"
            INSERT INTO scan_results (
                id, scan_id, abnormalities_detected, confidence_score, ai_model,
                findings, severity, triage_priority, raw_analysis, processed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                result.id,
                result.scan_id,
                result.abnormalities_detected,
                result.confidence_score,
                result.ai_model,
                findings_json,
                result.severity.as_str(),
                result.triage_priority,
                result.raw_analysis,
                result.processed_at,
            ],
        )?;
        Ok(())
    }

    /// Store a completed analysis and mark its scan analyzed, atomically.
    ///
    /// Nothing is stored unless the scan is currently being analyzed.
    pub fn record_analysis(&self, outcome: &AnalysisOutcome) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.mark_scan_analyzed(&outcome.result.scan_id, outcome.scan_type, &outcome.body_part)?;
        self.insert_result(&outcome.result)?;
        tx.commit()?;
        Ok(())
    }

    /// Get a result by ID.
    pub fn get_result(&self, result_id: &str) -> DbResult<Option<ScanResult>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM scan_results WHERE id = ?", RESULT_COLUMNS),
                [result_id],
                read_result_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Most recent result for a scan.
    pub fn latest_result_for_scan(&self, scan_id: &str) -> DbResult<Option<ScanResult>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM scan_results WHERE scan_id = ? ORDER BY processed_at DESC, rowid DESC LIMIT 1",
                    RESULT_COLUMNS
                ),
                [scan_id],
                read_result_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// All results for a scan, oldest first.
    pub fn list_results_for_scan(&self, scan_id: &str) -> DbResult<Vec<ScanResult>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM scan_results WHERE scan_id = ? ORDER BY processed_at, rowid",
            RESULT_COLUMNS
        ))?;
        let rows = stmt.query_map([scan_id], read_result_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?.try_into()?);
        }
        Ok(results)
    }
}

/// Intermediate row struct for database mapping.
struct ResultRow {
    id: String,
    scan_id: String,
    abnormalities_detected: bool,
    confidence_score: f64,
    ai_model: String,
    findings: String,
    severity: String,
    triage_priority: u8,
    raw_analysis: String,
    processed_at: String,
}

fn read_result_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ResultRow> {
    Ok(ResultRow {
        id: row.get(0)?,
        scan_id: row.get(1)?,
        abnormalities_detected: row.get(2)?,
        confidence_score: row.get(3)?,
        ai_model: row.get(4)?,
        findings: row.get(5)?,
        severity: row.get(6)?,
        triage_priority: row.get(7)?,
        raw_analysis: row.get(8)?,
        processed_at: row.get(9)?,
    })
}

impl TryFrom<ResultRow> for ScanResult {
    type Error = DbError;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        let findings: Vec<Finding> = serde_json::from_str(&row.findings)?;

        Ok(ScanResult {
            id: row.id,
            scan_id: row.scan_id,
            abnormalities_detected: row.abnormalities_detected,
            confidence_score: row.confidence_score,
            ai_model: row.ai_model,
            findings,
            severity: SeverityLevel::parse_lenient(&row.severity),
            triage_priority: row.triage_priority,
            raw_analysis: row.raw_analysis,
            processed_at: row.processed_at,
        })
    }
}
