// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support-conversation CRUD operations.

use chrono::{DateTime, Utc};
use rusqlite::params;
use suptrack_core::SuptrackError;

use crate::database::{decode_ts, encode_ts, Database};
use crate::models::{decode_enum, decode_json, Conversation, ConversationState};

fn map_row(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    let state: String = row.get(2)?;
    let data: String = row.get(4)?;
    let form: Option<String> = row.get(5)?;
    let last_interaction_at: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;

    let data = match decode_json(4, &data)? {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    Ok(Conversation {
        id: row.get(0)?,
        phone: row.get(1)?,
        state: decode_enum(2, &state)?,
        attempts: row.get(3)?,
        data,
        form: form.map(|f| decode_json(5, &f)).transpose()?,
        last_interaction_at: decode_ts(6, last_interaction_at)?,
        created_at: decode_ts(7, created_at)?,
        updated_at: decode_ts(8, updated_at)?,
    })
}

const COLUMNS: &str = "id, phone, state, attempts, data, form, \
                       last_interaction_at, created_at, updated_at";

/// Fetch the conversation for a phone, creating it in INICIO if unseen.
pub async fn get_or_create(db: &Database, phone: &str) -> Result<Conversation, SuptrackError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO conversations (phone) VALUES (?1)",
                params![phone],
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM conversations WHERE phone = ?1"
            ))?;
            let conversation = stmt.query_row(params![phone], map_row)?;
            Ok(conversation)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a conversation by phone.
pub async fn get(db: &Database, phone: &str) -> Result<Option<Conversation>, SuptrackError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM conversations WHERE phone = ?1"
            ))?;
            match stmt.query_row(params![phone], map_row) {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist an engine transition: new state, attempts, data map, and
/// optionally a cleared form. Also bumps `last_interaction_at`.
pub async fn apply_transition(
    db: &Database,
    phone: &str,
    state: ConversationState,
    attempts: i64,
    data: &serde_json::Map<String, serde_json::Value>,
    clear_form: bool,
    now: DateTime<Utc>,
) -> Result<(), SuptrackError> {
    let phone = phone.to_string();
    let state = state.to_string();
    let data = serde_json::Value::Object(data.clone()).to_string();
    let ts = encode_ts(now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations
                 SET state = ?1, attempts = ?2, data = ?3,
                     form = CASE WHEN ?4 THEN NULL ELSE form END,
                     last_interaction_at = ?5, updated_at = ?5
                 WHERE phone = ?6",
                params![state, attempts, data, clear_form, ts, phone],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update `last_interaction_at` without touching state.
pub async fn touch(db: &Database, phone: &str, now: DateTime<Utc>) -> Result<(), SuptrackError> {
    let phone = phone.to_string();
    let ts = encode_ts(now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET last_interaction_at = ?1, updated_at = ?1
                 WHERE phone = ?2",
                params![ts, phone],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Attach a submitted ticket form and move the conversation to FIN.
///
/// Returns false if no conversation exists for the phone.
pub async fn attach_form(
    db: &Database,
    phone: &str,
    form: &serde_json::Value,
    now: DateTime<Utc>,
) -> Result<bool, SuptrackError> {
    let phone = phone.to_string();
    let form = form.to_string();
    let ts = encode_ts(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE conversations
                 SET form = ?1, state = 'FIN', last_interaction_at = ?2, updated_at = ?2
                 WHERE phone = ?3",
                params![form, ts, phone],
            )?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
