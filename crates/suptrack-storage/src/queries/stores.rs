// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store directory lookups for the support-flow authorization step.

use rusqlite::params;
use suptrack_core::SuptrackError;

use crate::database::Database;
use crate::models::StoreRecord;

fn map_row(row: &rusqlite::Row<'_>) -> Result<StoreRecord, rusqlite::Error> {
    Ok(StoreRecord {
        code: row.get(0)?,
        local: row.get(1)?,
        business: row.get(2)?,
        region: row.get(3)?,
        name: row.get(4)?,
    })
}

/// Insert or replace a store record.
pub async fn upsert(db: &Database, store: &StoreRecord) -> Result<(), SuptrackError> {
    let store = store.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO stores (code, local, business, region, name)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![store.code, store.local, store.business, store.region, store.name],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All store records, for building an in-memory snapshot.
pub async fn list_all(db: &Database) -> Result<Vec<StoreRecord>, SuptrackError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT code, local, business, region, name FROM stores")?;
            let rows = stmt.query_map([], map_row)?;
            let mut stores = Vec::new();
            for row in rows {
                stores.push(row?);
            }
            Ok(stores)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find a store by its local number.
pub async fn find_by_local(db: &Database, local: i64) -> Result<Option<StoreRecord>, SuptrackError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT code, local, business, region, name FROM stores WHERE local = ?1",
            )?;
            match stmt.query_row(params![local], map_row) {
                Ok(store) => Ok(Some(store)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Whether a (local, code) pair matches the directory.
pub async fn code_matches(db: &Database, local: i64, code: &str) -> Result<bool, SuptrackError> {
    let code = code.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM stores WHERE local = ?1 AND code = ?2",
                params![local, code],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
