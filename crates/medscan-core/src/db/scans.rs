//! Scan database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Scan, ScanStatus, ScanType};

const SCAN_COLUMNS: &str = r#"
    id, patient_id, file_name, content_hash, scan_type,
    body_part, status, created_at, updated_at
"#;

impl Database {
    /// Insert a new scan.
    pub fn insert_scan(&self, scan: &Scan) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO scans (
                id, patient_id, file_name, content_hash, scan_type,
                body_part, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                scan.id,
                scan.patient_id,
                scan.file_name,
                scan.content_hash,
                scan.scan_type.as_str(),
                scan.body_part,
                scan.status.as_str(),
                scan.created_at,
                scan.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a scan by ID.
    pub fn get_scan(&self, scan_id: &str) -> DbResult<Option<Scan>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM scans WHERE id = ?", SCAN_COLUMNS),
                [scan_id],
                read_scan_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List scans for a patient, newest first.
    pub fn list_scans_for_patient(&self, patient_id: &str) -> DbResult<Vec<Scan>> {
        self.query_scans(
            &format!(
                "SELECT {} FROM scans WHERE patient_id = ? ORDER BY created_at DESC",
                SCAN_COLUMNS
            ),
            patient_id,
        )
    }

    /// Find scans whose image bytes hash to `content_hash`.
    pub fn find_scans_by_hash(&self, content_hash: &str) -> DbResult<Vec<Scan>> {
        self.query_scans(
            &format!(
                "SELECT {} FROM scans WHERE content_hash = ? ORDER BY created_at",
                SCAN_COLUMNS
            ),
            content_hash,
        )
    }

    /// Atomically move a scan into `analyzing`.
    ///
    /// Returns `false` when an analysis is already in flight for the scan.
    pub fn begin_analysis(&self, scan_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE scans SET status = 'analyzing', updated_at = datetime('now')
            WHERE id = ?1 AND status != 'analyzing'
            "#,
            [scan_id],
        )?;
        if rows_affected > 0 {
            return Ok(true);
        }
        match self.get_scan(scan_id)? {
            Some(_) => Ok(false),
            None => Err(DbError::NotFound(format!("scan {}", scan_id))),
        }
    }

    /// Record the metadata inferred by a completed analysis.
    ///
    /// Only a scan in the `analyzing` state can be completed.
    pub fn mark_scan_analyzed(&self, scan_id: &str, scan_type: ScanType, body_part: &str) -> DbResult<()> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE scans SET
                scan_type = ?2,
                body_part = ?3,
                status = 'analyzed',
                updated_at = datetime('now')
            WHERE id = ?1 AND status = 'analyzing'
            "#,
            params![scan_id, scan_type.as_str(), body_part],
        )?;
        self.check_transition(scan_id, rows_affected)
    }

    /// Mark the in-flight analysis as failed.
    pub fn mark_scan_failed(&self, scan_id: &str) -> DbResult<()> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE scans SET status = 'failed', updated_at = datetime('now')
            WHERE id = ?1 AND status = 'analyzing'
            "#,
            [scan_id],
        )?;
        self.check_transition(scan_id, rows_affected)
    }

    fn check_transition(&self, scan_id: &str, rows_affected: usize) -> DbResult<()> {
        if rows_affected > 0 {
            return Ok(());
        }
        match self.get_scan(scan_id)? {
            Some(_) => Err(DbError::NotAnalyzing(scan_id.to_string())),
            None => Err(DbError::NotFound(format!("scan {}", scan_id))),
        }
    }

    fn query_scans(&self, sql: &str, param: &str) -> DbResult<Vec<Scan>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([param], read_scan_row)?;

        let mut scans = Vec::new();
        for row in rows {
            scans.push(row?.try_into()?);
        }
        Ok(scans)
    }
}

/// Intermediate row struct for database mapping.
struct ScanRow {
    id: String,
    patient_id: String,
    file_name: String,
    content_hash: String,
    scan_type: String,
    body_part: String,
    status: String,
    created_at: String,
    updated_at: String,
}

fn read_scan_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScanRow> {
    Ok(ScanRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        file_name: row.get(2)?,
        content_hash: row.get(3)?,
        scan_type: row.get(4)?,
        body_part: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl TryFrom<ScanRow> for Scan {
    type Error = DbError;

    fn try_from(row: ScanRow) -> Result<Self, Self::Error> {
        Ok(Scan {
            id: row.id,
            patient_id: row.patient_id,
            file_name: row.file_name,
            content_hash: row.content_hash,
            scan_type: ScanType::parse(&row.scan_type),
            body_part: row.body_part,
            status: string_to_status(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn string_to_status(s: &str) -> Result<ScanStatus, DbError> {
    match s {
        "uploaded" => Ok(ScanStatus::Uploaded),
        "analyzing" => Ok(ScanStatus::Analyzing),
        "analyzed" => Ok(ScanStatus::Analyzed),
        "failed" => Ok(ScanStatus::Failed),
        _ => Err(DbError::Constraint(format!("Unknown scan status: {}", s))),
    }
}
