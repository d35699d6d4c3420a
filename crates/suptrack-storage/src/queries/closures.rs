// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable silence-check queue.
//!
//! Arming a check persists a row instead of relying on an in-process
//! timer, so pending deadlines survive restarts. Claiming marks the row
//! done before the closer runs; the closer's own status/deadline check
//! makes at-least-once delivery safe.

use chrono::{DateTime, Utc};
use rusqlite::params;
use suptrack_core::SuptrackError;

use crate::database::{decode_ts, encode_ts, Database};
use crate::models::SilenceCheck;

/// Arm a silence check for a follow-up at `due_at`. Returns the row id.
pub async fn arm(
    db: &Database,
    follow_up_id: i64,
    due_at: DateTime<Utc>,
) -> Result<i64, SuptrackError> {
    let due = encode_ts(due_at);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO silence_checks (follow_up_id, due_at) VALUES (?1, ?2)",
                params![follow_up_id, due],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim all due pending checks, oldest first, bounded batch.
///
/// Each row is flipped pending -> done inside one transaction, so a
/// concurrent poller cannot claim the same row twice.
pub async fn claim_due(
    db: &Database,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<SilenceCheck>, SuptrackError> {
    let ts = encode_ts(now);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut claimed = Vec::new();
            {
                let mut stmt = tx.prepare(
                    "SELECT id, follow_up_id, due_at, status, created_at
                     FROM silence_checks
                     WHERE status = 'pending' AND due_at <= ?1
                     ORDER BY due_at ASC LIMIT ?2",
                )?;
                let rows = stmt.query_map(params![ts, limit as i64], |row| {
                    let due_at: String = row.get(2)?;
                    let created_at: String = row.get(4)?;
                    Ok(SilenceCheck {
                        id: row.get(0)?,
                        follow_up_id: row.get(1)?,
                        due_at: decode_ts(2, due_at)?,
                        status: "done".to_string(),
                        created_at: decode_ts(4, created_at)?,
                    })
                })?;
                for row in rows {
                    claimed.push(row?);
                }
            }
            for check in &claimed {
                tx.execute(
                    "UPDATE silence_checks SET status = 'done' WHERE id = ?1",
                    params![check.id],
                )?;
            }
            tx.commit()?;
            Ok(claimed)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
