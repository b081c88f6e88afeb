//! Report database operations.
//!
//! Reports are versioned per scan result. Saving a report for a result that
//! already has an active one supersedes it in the same transaction.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Report;

const REPORT_COLUMNS: &str = r#"
    id, scan_result_id, version, patient_summary, clinical_details,
    recommendations, superseded_by, created_at, updated_at
"#;

impl Database {
    /// Store a report as the new active version for its scan result.
    ///
    /// Returns the stored report with its assigned version.
    pub fn save_report(&self, report: &Report) -> DbResult<Report> {
        let tx = self.conn.unchecked_transaction()?;

        let next_version: u32 = tx.query_row(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM reports WHERE scan_result_id = ?",
            [&report.scan_result_id],
            |row| row.get(0),
        )?;

        let superseded = tx.execute(
            r#"
            UPDATE reports SET superseded_by = ?2, updated_at = ?3
            WHERE scan_result_id = ?1 AND superseded_by IS NULL
            "#,
            params![
                report.scan_result_id,
                report.id,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;

        let stored = Report {
            version: next_version,
            superseded_by: None,
            ..report.clone()
        };

        tx.execute(
            r#"
            INSERT INTO reports (
                id, scan_result_id, version, patient_summary, clinical_details,
                recommendations, superseded_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7, ?8)
            "#,
            params![
                stored.id,
                stored.scan_result_id,
                stored.version,
                stored.patient_summary,
                stored.clinical_details,
                stored.recommendations,
                stored.created_at,
                stored.updated_at,
            ],
        )?;

        tx.commit()?;

        if superseded > 0 {
            tracing::info!(
                "Report {} v{} supersedes previous version for result {}",
                stored.id,
                stored.version,
                stored.scan_result_id
            );
        }

        Ok(stored)
    }

    /// Get a report by ID (any version).
    pub fn get_report(&self, report_id: &str) -> DbResult<Option<Report>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {} FROM reports WHERE id = ?", REPORT_COLUMNS),
                [report_id],
                read_report_row,
            )
            .optional()?)
    }

    /// The active report for a scan result.
    pub fn get_active_report(&self, scan_result_id: &str) -> DbResult<Option<Report>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM reports WHERE scan_result_id = ? AND superseded_by IS NULL",
                    REPORT_COLUMNS
                ),
                [scan_result_id],
                read_report_row,
            )
            .optional()?)
    }

    /// Every version for a scan result, oldest first.
    pub fn list_report_versions(&self, scan_result_id: &str) -> DbResult<Vec<Report>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM reports WHERE scan_result_id = ? ORDER BY version",
            REPORT_COLUMNS
        ))?;
        let rows = stmt.query_map([scan_result_id], read_report_row)?;

        let mut reports = Vec::new();
        for row in rows {
            reports.push(row?);
        }
        Ok(reports)
    }
}

fn read_report_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Report> {
    Ok(Report {
        id: row.get(0)?,
        scan_result_id: row.get(1)?,
        version: row.get(2)?,
        patient_summary: row.get(3)?,
        clinical_details: row.get(4)?,
        recommendations: row.get(5)?,
        superseded_by: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
