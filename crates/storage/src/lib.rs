// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Storage layer for the sync orchestration daemon: the write-ahead log,
//! materialized state, background checkpointing, and the two embedded SQL
//! stores named in §6 (alarms, deleted items).

mod alarm_store;
mod checkpoint;
mod deleted_items_store;
mod error;
mod migration;
mod snapshot;
mod state;
mod wal;

pub use alarm_store::{AlarmRow, AlarmStore, AlarmStoreError};
pub use checkpoint::{
    load_snapshot, CheckpointError, CheckpointHandle, CheckpointResult, CheckpointWriter,
    Checkpointer, FsCheckpointWriter,
};
pub use deleted_items_store::{
    DeletedItem, DeletedItemsStore, DeletedItemsStoreError, SnapshotItem,
};
pub use error::StorageError;
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::MaterializedState;
pub use wal::{Wal, WalEntry, WalError};
