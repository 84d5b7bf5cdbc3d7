// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded SQL store for the deleted-items snapshot (§6), used by plugins
//! that need to know which remote items a local storage has deleted since
//! their last sync.

use chrono::{DateTime, Local, Utc};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeletedItemsStoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// One row of the `snapshot` table: an item present as of `creation_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotItem {
    pub item_id: String,
    pub creation_time: DateTime<Utc>,
}

/// One row of the `deleteditems` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedItem {
    pub item_id: String,
    pub creation_time: DateTime<Utc>,
    pub delete_time: DateTime<Utc>,
}

/// SQLite-backed persistence for a storage's deleted-items bookkeeping.
///
/// Schema: `snapshot(itemid VARCHAR(512) PK, creationtime TIMESTAMP)` and
/// `deleteditems(itemid VARCHAR(512) PK, creationtime TIMESTAMP, deletetime
/// TIMESTAMP)`. All timestamps are stored UTC; `get_deleted_items` converts
/// to local time on the way out, per §6.
pub struct DeletedItemsStore {
    conn: rusqlite::Connection,
}

impl DeletedItemsStore {
    pub fn open(path: &Path) -> Result<Self, DeletedItemsStoreError> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = rusqlite::Connection::open(path)?;
        Self::create_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, DeletedItemsStoreError> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Self::create_schema(&conn)?;
        Ok(Self { conn })
    }

    fn create_schema(conn: &rusqlite::Connection) -> Result<(), DeletedItemsStoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS snapshot (
                itemid VARCHAR(512) PRIMARY KEY,
                creationtime TIMESTAMP NOT NULL
            );
            CREATE TABLE IF NOT EXISTS deleteditems (
                itemid VARCHAR(512) PRIMARY KEY,
                creationtime TIMESTAMP NOT NULL,
                deletetime TIMESTAMP NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Replace the entire snapshot table with `items`.
    pub fn set_snapshot(&mut self, items: &[SnapshotItem]) -> Result<(), DeletedItemsStoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM snapshot", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO snapshot (itemid, creationtime) VALUES (?1, ?2)")?;
            for item in items {
                stmt.execute(rusqlite::params![item.item_id, item.creation_time.to_rfc3339()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_snapshot(&self) -> Result<Vec<SnapshotItem>, DeletedItemsStoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT itemid, creationtime FROM snapshot")?;
        let rows = stmt.query_map([], |row| {
            let item_id: String = row.get(0)?;
            let creation_time: String = row.get(1)?;
            Ok((item_id, creation_time))
        })?;
        let mut items = Vec::new();
        for row in rows {
            let (item_id, creation_time) = row?;
            items.push(SnapshotItem {
                item_id,
                creation_time: parse_utc(&creation_time),
            });
        }
        Ok(items)
    }

    /// Append `items` to the deleted-items table (batch insert).
    pub fn add_deleted_items(&mut self, items: &[DeletedItem]) -> Result<(), DeletedItemsStoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO deleteditems (itemid, creationtime, deletetime)
                 VALUES (?1, ?2, ?3)",
            )?;
            for item in items {
                stmt.execute(rusqlite::params![
                    item.item_id,
                    item.creation_time.to_rfc3339(),
                    item.delete_time.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Rows with `creationtime < since < deletetime`, converted to local
    /// time on read per §6.
    pub fn get_deleted_items(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(String, DateTime<Local>, DateTime<Local>)>, DeletedItemsStoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT itemid, creationtime, deletetime FROM deleteditems
             WHERE creationtime < ?1 AND deletetime > ?1",
        )?;
        let since_str = since.to_rfc3339();
        let rows = stmt.query_map(rusqlite::params![since_str], |row| {
            let item_id: String = row.get(0)?;
            let creation_time: String = row.get(1)?;
            let delete_time: String = row.get(2)?;
            Ok((item_id, creation_time, delete_time))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (item_id, creation_time, delete_time) = row?;
            out.push((
                item_id,
                parse_utc(&creation_time).with_timezone(&Local),
                parse_utc(&delete_time).with_timezone(&Local),
            ));
        }
        Ok(out)
    }
}

fn parse_utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
#[path = "deleted_items_store_tests.rs"]
mod tests;
