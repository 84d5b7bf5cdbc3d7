// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded SQL store for the scheduler's alarm inventory (§6).
//!
//! One dedicated SQLite connection per daemon instance, holding a single
//! table of future wake-up instants. On init the table is truncated: any
//! rows that survive a restart predate the current run and are re-derived
//! from current profile state rather than trusted as-is.

use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AlarmStoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// One row of the `alarms` table: a future wake-up instant for a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmRow {
    pub id: i64,
    pub fire_at: DateTime<Utc>,
    pub profile: String,
}

/// SQLite-backed persistence for the `AlarmInventory` (§4.3, §6).
///
/// Schema: `alarms(alarmid INTEGER PRIMARY KEY AUTOINCREMENT, synctime
/// DATETIME, profile TEXT NOT NULL)`. `alarmid` is the real AUTOINCREMENT
/// rowid; there is no placeholder-id path (see SPEC_FULL.md §9).
pub struct AlarmStore {
    conn: rusqlite::Connection,
}

impl AlarmStore {
    /// Open (creating if needed) the alarm database at `path`, then truncate
    /// it — surviving rows predate this run and are stale by definition.
    pub fn open(path: &Path) -> Result<Self, AlarmStoreError> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = rusqlite::Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS alarms (
                alarmid INTEGER PRIMARY KEY AUTOINCREMENT,
                synctime DATETIME NOT NULL,
                profile TEXT NOT NULL
            );",
        )?;
        let removed = conn.execute("DELETE FROM alarms", [])?;
        if removed > 0 {
            warn!(removed, "Discarding stale alarms from a previous run");
        }
        Ok(Self { conn })
    }

    /// Open an in-memory store, for tests that want SQL semantics without a
    /// file on disk.
    pub fn open_in_memory() -> Result<Self, AlarmStoreError> {
        let conn = rusqlite::Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE alarms (
                alarmid INTEGER PRIMARY KEY AUTOINCREMENT,
                synctime DATETIME NOT NULL,
                profile TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    /// Insert a new alarm, returning the AUTOINCREMENT rowid assigned to it.
    pub fn add_alarm(&self, fire_at: DateTime<Utc>, profile: &str) -> Result<i64, AlarmStoreError> {
        self.conn.execute(
            "INSERT INTO alarms (synctime, profile) VALUES (?1, ?2)",
            rusqlite::params![fire_at.to_rfc3339(), profile],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn remove_alarm(&self, id: i64) -> Result<(), AlarmStoreError> {
        self.conn
            .execute("DELETE FROM alarms WHERE alarmid = ?1", rusqlite::params![id])?;
        Ok(())
    }

    /// Remove any alarm(s) armed for `profile`, enforcing invariant 3
    /// (at most one armed alarm per profile) from the writer side.
    pub fn remove_alarms_for_profile(&self, profile: &str) -> Result<(), AlarmStoreError> {
        self.conn
            .execute("DELETE FROM alarms WHERE profile = ?1", rusqlite::params![profile])?;
        Ok(())
    }

    /// List every armed alarm, ordered by fire time (earliest first), for
    /// rebuilding the in-memory min-heap on startup.
    pub fn list_alarms(&self) -> Result<Vec<AlarmRow>, AlarmStoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT alarmid, synctime, profile FROM alarms ORDER BY synctime ASC, alarmid ASC")?;
        let rows = stmt.query_map([], |row| {
            let synctime: String = row.get(1)?;
            let fire_at = DateTime::parse_from_rfc3339(&synctime)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());
            Ok(AlarmRow {
                id: row.get(0)?,
                fire_at,
                profile: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
#[path = "alarm_store_tests.rs"]
mod tests;
