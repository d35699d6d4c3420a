// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reschedule queue operations.
//!
//! Rows are consumed with an optimistic claim: a conditional UPDATE
//! PENDIENTE -> PROCESANDO whose affected-row count decides the winner.

use chrono::{DateTime, Utc};
use rusqlite::params;
use suptrack_core::SuptrackError;

use crate::database::{decode_ts, decode_ts_opt, encode_ts, Database};
use crate::models::{decode_enum, decode_json, NewReschedule, Reschedule};

const COLUMNS: &str = "id, origin_followup_id, case_id, tririga_no, site_id, criticality, \
                       supplier_name, supplier_tax_id, supplier_phone, path, execute_from_at, \
                       status, reason, attempts, last_error, executed_at, ticket_payload, \
                       created_at, updated_at";

fn map_row(row: &rusqlite::Row<'_>) -> Result<Reschedule, rusqlite::Error> {
    let execute_from_at: String = row.get(10)?;
    let status: String = row.get(11)?;
    let ticket_payload: Option<String> = row.get(16)?;
    let created_at: String = row.get(17)?;
    let updated_at: String = row.get(18)?;

    Ok(Reschedule {
        id: row.get(0)?,
        origin_followup_id: row.get(1)?,
        case_id: row.get(2)?,
        tririga_no: row.get(3)?,
        site_id: row.get(4)?,
        criticality: row.get(5)?,
        supplier_name: row.get(6)?,
        supplier_tax_id: row.get(7)?,
        supplier_phone: row.get(8)?,
        path: row.get(9)?,
        execute_from_at: decode_ts(10, execute_from_at)?,
        status: decode_enum(11, &status)?,
        reason: row.get(12)?,
        attempts: row.get(13)?,
        last_error: row.get(14)?,
        executed_at: decode_ts_opt(15, row.get(15)?)?,
        ticket_payload: ticket_payload.map(|p| decode_json(16, &p)).transpose()?,
        created_at: decode_ts(17, created_at)?,
        updated_at: decode_ts(18, updated_at)?,
    })
}

/// Insert a PENDIENTE reschedule row. Returns the row id.
pub async fn create(db: &Database, new: &NewReschedule) -> Result<i64, SuptrackError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO reschedules (origin_followup_id, case_id, tririga_no, site_id,
                     criticality, supplier_name, supplier_tax_id, supplier_phone, path,
                     execute_from_at, reason, ticket_payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    new.origin_followup_id,
                    new.case_id,
                    new.tririga_no,
                    new.site_id,
                    new.criticality,
                    new.supplier_name,
                    new.supplier_tax_id,
                    new.supplier_phone,
                    new.path,
                    encode_ts(new.execute_from_at),
                    new.reason,
                    new.ticket_payload.map(|p| p.to_string()),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a reschedule by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Reschedule>, SuptrackError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM reschedules WHERE id = ?1"))?;
            match stmt.query_row(params![id], map_row) {
                Ok(reschedule) => Ok(Some(reschedule)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Due PENDIENTE rows, oldest first, bounded batch.
pub async fn list_due(
    db: &Database,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Reschedule>, SuptrackError> {
    let ts = encode_ts(now);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM reschedules
                 WHERE status = 'PENDIENTE' AND execute_from_at <= ?1
                 ORDER BY execute_from_at ASC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![ts, limit as i64], map_row)?;
            let mut reschedules = Vec::new();
            for row in rows {
                reschedules.push(row?);
            }
            Ok(reschedules)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim a row for processing: PENDIENTE -> PROCESANDO.
///
/// Returns false if another worker already claimed it.
pub async fn claim(db: &Database, id: i64) -> Result<bool, SuptrackError> {
    let now = encode_ts(Utc::now());
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE reschedules SET status = 'PROCESANDO', updated_at = ?1
                 WHERE id = ?2 AND status = 'PENDIENTE'",
                params![now, id],
            )?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a claimed row as consumed.
pub async fn mark_executed(db: &Database, id: i64, now: DateTime<Utc>) -> Result<(), SuptrackError> {
    let ts = encode_ts(now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE reschedules SET status = 'EJECUTADO', executed_at = ?1, updated_at = ?1
                 WHERE id = ?2",
                params![ts, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a failure: FALLIDO, attempts + 1, and a bumped retry time.
pub async fn mark_failed(
    db: &Database,
    id: i64,
    error: &str,
    retry_at: DateTime<Utc>,
) -> Result<(), SuptrackError> {
    let error = error.to_string();
    let retry = encode_ts(retry_at);
    let now = encode_ts(Utc::now());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE reschedules
                 SET status = 'FALLIDO', attempts = attempts + 1,
                     last_error = ?1, execute_from_at = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![error, retry, now, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
