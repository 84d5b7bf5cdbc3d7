// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level error type composing every storage subsystem's own error enum.

use thiserror::Error;

use crate::alarm_store::AlarmStoreError;
use crate::checkpoint::CheckpointError;
use crate::deleted_items_store::DeletedItemsStoreError;
use crate::migration::MigrationError;
use crate::snapshot::SnapshotError;
use crate::wal::WalError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Wal(#[from] WalError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    AlarmStore(#[from] AlarmStoreError),
    #[error(transparent)]
    DeletedItemsStore(#[from] DeletedItemsStoreError),
}
