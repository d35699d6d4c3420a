// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short-lived claim markers: webhook message dedup and per-phone locks.
//!
//! Both tables use the same pattern: purge expired rows, then
//! `INSERT OR IGNORE` — the insert that sticks owns the claim.

use chrono::{DateTime, Duration, Utc};
use rusqlite::params;
use suptrack_core::SuptrackError;

use crate::database::{encode_ts, Database};

/// Claim an inbound message id for processing.
///
/// Returns true for the first delivery; repeat deliveries within
/// `ttl_min` minutes return false and must be dropped silently.
pub async fn claim_message(
    db: &Database,
    message_id: &str,
    now: DateTime<Utc>,
    ttl_min: i64,
) -> Result<bool, SuptrackError> {
    let message_id = message_id.to_string();
    let now_ts = encode_ts(now);
    let expires = encode_ts(now + Duration::minutes(ttl_min));
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM dedup_markers WHERE expires_at <= ?1",
                params![now_ts],
            )?;
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO dedup_markers (message_id, expires_at) VALUES (?1, ?2)",
                params![message_id, expires],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim a short-lived conversation-start lock for a supplier phone.
///
/// Prevents two follow-ups opening a conversation with the same phone in
/// the same ingestion window.
pub async fn claim_phone_lock(
    db: &Database,
    phone: &str,
    now: DateTime<Utc>,
    ttl_min: i64,
) -> Result<bool, SuptrackError> {
    let phone = phone.to_string();
    let now_ts = encode_ts(now);
    let expires = encode_ts(now + Duration::minutes(ttl_min));
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM phone_locks WHERE expires_at <= ?1",
                params![now_ts],
            )?;
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO phone_locks (phone, expires_at) VALUES (?1, ?2)",
                params![phone, expires],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
