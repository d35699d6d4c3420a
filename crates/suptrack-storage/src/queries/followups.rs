// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Follow-up CRUD and compare-and-swap transitions.
//!
//! Every status change goes through a conditional UPDATE keyed on the
//! expected current status. A zero affected-row count means a concurrent
//! transition won; callers must skip their side effects in that case.

use chrono::{DateTime, Utc};
use rusqlite::params;
use suptrack_core::SuptrackError;

use crate::database::{decode_ts, decode_ts_opt, encode_ts, Database};
use crate::models::{
    decode_enum, decode_enum_opt, decode_json, FollowUp, FollowUpStatus, FollowUpSubState,
    NewFollowUp,
};

const COLUMNS: &str = "id, case_id, tririga_no, site_id, criticality, supplier_name, \
                       supplier_tax_id, supplier_phone, path, status, sub_state, sent_at, \
                       reply_deadline_at, closed_at, scheduled_execute_at, \
                       confirmed_arrival_at, ticket_payload, created_at, updated_at";

fn map_row(row: &rusqlite::Row<'_>) -> Result<FollowUp, rusqlite::Error> {
    let status: String = row.get(9)?;
    let sub_state: Option<String> = row.get(10)?;
    let ticket_payload: Option<String> = row.get(16)?;
    let created_at: String = row.get(17)?;
    let updated_at: String = row.get(18)?;

    Ok(FollowUp {
        id: row.get(0)?,
        case_id: row.get(1)?,
        tririga_no: row.get(2)?,
        site_id: row.get(3)?,
        criticality: row.get(4)?,
        supplier_name: row.get(5)?,
        supplier_tax_id: row.get(6)?,
        supplier_phone: row.get(7)?,
        path: row.get(8)?,
        status: decode_enum(9, &status)?,
        sub_state: decode_enum_opt(10, sub_state)?,
        sent_at: decode_ts_opt(11, row.get(11)?)?,
        reply_deadline_at: decode_ts_opt(12, row.get(12)?)?,
        closed_at: decode_ts_opt(13, row.get(13)?)?,
        scheduled_execute_at: decode_ts_opt(14, row.get(14)?)?,
        confirmed_arrival_at: decode_ts_opt(15, row.get(15)?)?,
        ticket_payload: ticket_payload.map(|p| decode_json(16, &p)).transpose()?,
        created_at: decode_ts(17, created_at)?,
        updated_at: decode_ts(18, updated_at)?,
    })
}

fn status_list(statuses: &[FollowUpStatus]) -> String {
    statuses
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Insert a new follow-up in PENDIENTE_FLUJO. Returns the row id.
pub async fn create(db: &Database, new: &NewFollowUp) -> Result<i64, SuptrackError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO follow_ups (case_id, tririga_no, site_id, criticality,
                     supplier_name, supplier_tax_id, supplier_phone, path,
                     scheduled_execute_at, ticket_payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    new.case_id,
                    new.tririga_no,
                    new.site_id,
                    new.criticality,
                    new.supplier_name,
                    new.supplier_tax_id,
                    new.supplier_phone,
                    new.path,
                    new.scheduled_execute_at.map(encode_ts),
                    new.ticket_payload.map(|p| p.to_string()),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a follow-up by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<FollowUp>, SuptrackError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM follow_ups WHERE id = ?1"))?;
            match stmt.query_row(params![id], map_row) {
                Ok(follow_up) => Ok(Some(follow_up)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find the active follow-up for a supplier phone, if any.
///
/// Active means status MENSAJE_ENVIADO or ESPERANDO_RESPUESTA. The newest
/// row wins if historical data ever violates the one-active invariant.
pub async fn find_active_by_phone(
    db: &Database,
    phone: &str,
) -> Result<Option<FollowUp>, SuptrackError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM follow_ups
                 WHERE supplier_phone = ?1
                   AND status IN ('MENSAJE_ENVIADO', 'ESPERANDO_RESPUESTA')
                 ORDER BY id DESC LIMIT 1"
            ))?;
            match stmt.query_row(params![phone], map_row) {
                Ok(follow_up) => Ok(Some(follow_up)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Whether any follow-up already exists for a case id (ingestion dedup).
pub async fn exists_for_case(db: &Database, case_id: &str) -> Result<bool, SuptrackError> {
    let case_id = case_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM follow_ups WHERE case_id = ?1",
                params![case_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fields written by a CAS transition.
///
/// `sub_state` and `reply_deadline_at` are overwritten (None clears them);
/// `sent_at`, `closed_at`, and `confirmed_arrival_at` are only written when
/// `Some`, preserving the existing value otherwise.
#[derive(Debug, Clone, Default)]
pub struct FollowUpUpdate {
    pub status: Option<FollowUpStatus>,
    pub sub_state: Option<FollowUpSubState>,
    pub reply_deadline_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub confirmed_arrival_at: Option<DateTime<Utc>>,
}

/// Compare-and-swap transition: applies `update` only if the row's current
/// status is one of `expected`. Returns whether the swap won.
pub async fn transition(
    db: &Database,
    id: i64,
    expected: &[FollowUpStatus],
    update: FollowUpUpdate,
) -> Result<bool, SuptrackError> {
    let expected = status_list(expected);
    let now = encode_ts(Utc::now());
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                &format!(
                    "UPDATE follow_ups
                     SET status = COALESCE(?1, status),
                         sub_state = ?2,
                         reply_deadline_at = ?3,
                         sent_at = COALESCE(?4, sent_at),
                         closed_at = COALESCE(?5, closed_at),
                         confirmed_arrival_at = COALESCE(?6, confirmed_arrival_at),
                         updated_at = ?7
                     WHERE id = ?8 AND status IN ({expected})"
                ),
                params![
                    update.status.map(|s| s.to_string()),
                    update.sub_state.map(|s| s.to_string()),
                    update.reply_deadline_at.map(encode_ts),
                    update.sent_at.map(encode_ts),
                    update.closed_at.map(encode_ts),
                    update.confirmed_arrival_at.map(encode_ts),
                    now,
                    id,
                ],
            )?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim a silence closure: moves a non-terminal row whose reply deadline
/// has elapsed to CERRADO_SIN_RESPUESTA. Returns whether this caller won
/// the claim; only the winner may send the closing template.
///
/// No deadline, an unelapsed deadline, or a terminal status all make this
/// a no-op, so redundant and early invocations are safe.
pub async fn close_by_silence(
    db: &Database,
    id: i64,
    now: DateTime<Utc>,
) -> Result<bool, SuptrackError> {
    let ts = encode_ts(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE follow_ups
                 SET status = 'CERRADO_SIN_RESPUESTA',
                     sub_state = NULL,
                     reply_deadline_at = NULL,
                     closed_at = ?1,
                     updated_at = ?1
                 WHERE id = ?2
                   AND status IN ('MENSAJE_ENVIADO', 'ESPERANDO_RESPUESTA')
                   AND reply_deadline_at IS NOT NULL
                   AND reply_deadline_at <= ?1",
                params![ts, id],
            )?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Due PENDIENTE_FLUJO rows for the initial-send retry sweep.
pub async fn list_due_pending_flow(
    db: &Database,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<FollowUp>, SuptrackError> {
    let ts = encode_ts(now);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM follow_ups
                 WHERE status = 'PENDIENTE_FLUJO'
                   AND (scheduled_execute_at IS NULL OR scheduled_execute_at <= ?1)
                 ORDER BY id ASC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![ts, limit as i64], map_row)?;
            let mut follow_ups = Vec::new();
            for row in rows {
                follow_ups.push(row?);
            }
            Ok(follow_ups)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
