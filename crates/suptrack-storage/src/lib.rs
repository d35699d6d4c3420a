// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the suptrack bot.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for
//! conversations, follow-ups, reschedules, dedup markers, and the durable
//! silence-check queue.
//!
//! All writes are serialized through one `tokio_rusqlite::Connection`
//! background thread. The `Database` struct IS the single writer; query
//! modules accept `&Database` and call through `db.connection().call()`.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::*;
pub use queries::followups::FollowUpUpdate;
