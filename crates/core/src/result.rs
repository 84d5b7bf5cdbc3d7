// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal results and the status/minor-code vocabulary attached to them.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Status of a sync session, broadcast on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Queued,
    Started,
    Progress,
    Stopping,
    Done,
    Aborted,
    Cancelled,
    Error,
    NotPossible,
}

impl SyncStatus {
    /// True for a status that ends the plugin session; matches the
    /// terminal exits of the `SyncSession` state machine (DONE / ERROR /
    /// CANCELLED / ABORTED) plus NOTPOSSIBLE for requests that never reached
    /// a session at all.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SyncStatus::Done
                | SyncStatus::Error
                | SyncStatus::Aborted
                | SyncStatus::Cancelled
                | SyncStatus::NotPossible
        )
    }
}

/// Minor code attached to every terminal result; the taxonomy of §7.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MinorCode {
    InternalError,
    Aborted,
    BackupInProgress,
    OfflineMode,
    LowBatteryPower,
    PowerSavingMode,
    /// Code reported by the plugin itself, passed through unmodified.
    Plugin(String),
}

/// Per-storage item counts for one session's transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetResult {
    pub target_id: String,
    pub added: u64,
    pub modified: u64,
    pub deleted: u64,
}

/// The one persisted record every sync session produces, whether it ran or
/// was failed synthetically before a plugin runner was ever spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub status: SyncStatus,
    pub minor_code: MinorCode,
    pub message: Option<String>,
    pub targets: Vec<TargetResult>,
    pub started_at: SystemTime,
    pub finished_at: SystemTime,
}

impl SyncResult {
    /// Build a synthetic failure result stamped before terminal emission, so
    /// every session produces exactly one persisted result row.
    pub fn failure(status: SyncStatus, minor_code: MinorCode, message: impl Into<String>, now: SystemTime) -> Self {
        Self {
            status,
            minor_code,
            message: Some(message.into()),
            targets: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
