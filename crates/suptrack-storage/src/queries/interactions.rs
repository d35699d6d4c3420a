// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only interaction log for the support flow.

use rusqlite::params;
use suptrack_core::SuptrackError;

use crate::database::{decode_ts, Database};
use crate::models::Interaction;

/// Append one message to the log. Callers treat failures as best-effort
/// and must not let them break the flow.
pub async fn record(
    db: &Database,
    phone: &str,
    direction: &str,
    body: &str,
    state: Option<&str>,
) -> Result<(), SuptrackError> {
    let phone = phone.to_string();
    let direction = direction.to_string();
    let body = body.to_string();
    let state = state.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO interactions (phone, direction, body, state)
                 VALUES (?1, ?2, ?3, ?4)",
                params![phone, direction, body, state],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent messages for a phone, newest first.
pub async fn recent_for_phone(
    db: &Database,
    phone: &str,
    limit: usize,
) -> Result<Vec<Interaction>, SuptrackError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, phone, direction, body, state, created_at
                 FROM interactions WHERE phone = ?1 ORDER BY id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![phone, limit as i64], |row| {
                let created_at: String = row.get(5)?;
                Ok(Interaction {
                    id: row.get(0)?,
                    phone: row.get(1)?,
                    direction: row.get(2)?,
                    body: row.get(3)?,
                    state: row.get(4)?,
                    created_at: decode_ts(5, created_at)?,
                })
            })?;
            let mut interactions = Vec::new();
            for row in rows {
                interactions.push(row?);
            }
            Ok(interactions)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
