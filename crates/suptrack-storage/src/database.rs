// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use suptrack_core::SuptrackError;

/// Handle to the single-writer SQLite database.
///
/// Cloning the inner connection is cheap and shares the same background
/// writer thread.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// all pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Database, SuptrackError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| crate::migrations::apply(conn))
            .await
            .map_err(|e| SuptrackError::Storage {
                source: Box::new(e),
            })?;

        Ok(Database { conn })
    }

    /// The shared tokio-rusqlite connection. All reads and writes go
    /// through `connection().call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the database, flushing the WAL.
    pub async fn close(self) -> Result<(), SuptrackError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> SuptrackError {
    SuptrackError::Storage {
        source: Box::new(e),
    }
}

/// Format a UTC instant the way SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ')`
/// does, so Rust-side and SQL-side timestamps sort and compare as strings.
pub fn encode_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp column back into UTC.
pub(crate) fn decode_ts(idx: usize, raw: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Parse an optional stored timestamp column.
pub(crate) fn decode_ts_opt(
    idx: usize,
    raw: Option<String>,
) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    raw.map(|s| decode_ts(idx, s)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_runs_migrations_and_sets_wal() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();

        let (journal_mode, table_count): (String, i64) = db
            .connection()
            .call(|conn| -> Result<(String, i64), tokio_rusqlite::Error> {
                let mode: String =
                    conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                     AND name IN ('conversations', 'follow_ups', 'reschedules',
                                  'silence_checks', 'dedup_markers', 'phone_locks',
                                  'stores', 'interactions')",
                    [],
                    |row| row.get(0),
                )?;
                Ok((mode, count))
            })
            .await
            .unwrap();

        assert_eq!(journal_mode, "wal");
        assert_eq!(table_count, 8);

        db.close().await.unwrap();
    }

    #[test]
    fn encode_ts_matches_sqlite_strftime_shape() {
        let at = "2026-03-10T12:34:56.789Z".parse().unwrap();
        assert_eq!(encode_ts(at), "2026-03-10T12:34:56.789Z");
    }

    #[test]
    fn decode_ts_roundtrips() {
        let at: DateTime<Utc> = "2026-03-10T12:34:56.789Z".parse().unwrap();
        let parsed = decode_ts(0, encode_ts(at)).unwrap();
        assert_eq!(parsed, at);
    }
}
