// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The domain event enum.
//!
//! One `Event` variant per thing that can happen. The same enum backs the
//! write-ahead log (every `Emit` effect persists one of these) and the
//! daemon's IPC broadcast surface (§6) — a connected client subscribes to a
//! filtered view of this stream rather than a separate wire type, the same
//! way the event log and the client protocol share one event type in the
//! engine this daemon is built on.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::alarm::AlarmId;
use crate::profile::{ClientProfileName, InternetType, ProfileName, StorageName};
use crate::result::{MinorCode, SyncResult, SyncStatus};
use crate::session::SessionId;
use crate::timer::TimerId;

/// Kind of change delivered by the (external) profile store watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileChangeKind {
    Added,
    Modified,
    Removed,
}

/// Direction of a transfer-progress tick, for logging/UI only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    Upload,
    Download,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A profile was added/modified/removed in the (external) profile store.
    ProfileChanged {
        profile: ProfileName,
        kind: ProfileChangeKind,
    },

    /// Public status broadcast for a profile's current/most recent session.
    SyncStatus {
        profile: ProfileName,
        status: SyncStatus,
        message: Option<String>,
        minor_code: Option<MinorCode>,
    },

    /// A session reached a terminal state and persisted its result.
    ResultsAvailable {
        profile: ProfileName,
        result: SyncResult,
    },

    TransferProgress {
        profile: ProfileName,
        storage: StorageName,
        direction: TransferDirection,
        mime_type: Option<String>,
        count: u64,
    },

    BackupInProgress,
    BackupDone,
    RestoreInProgress,
    RestoreDone,

    SyncedExternallyStatus {
        profile: ProfileName,
        account_id: String,
        client_profile_name: ClientProfileName,
        externally_synced: bool,
    },

    StatusChanged {
        account_id: String,
        status: SyncStatus,
        failed_reason: Option<MinorCode>,
        prev_sync_time: Option<SystemTime>,
        next_sync_time: Option<SystemTime>,
    },

    /// An alarm in the `AlarmInventory` reached its `fire_at`.
    AlarmFired {
        alarm_id: AlarmId,
        profile: ProfileName,
    },

    /// An in-memory `Scheduler` timer (rush-switch, SOC debounce,
    /// profile-change coalescing) reached its deadline.
    TimerFired { id: TimerId },

    ConnectivityChanged {
        online: bool,
        internet_type: InternetType,
    },

    SessionQueued {
        session_id: SessionId,
        profile: ProfileName,
    },
    SessionReserved { session_id: SessionId },
    SessionStarting { session_id: SessionId },
    SessionRunning { session_id: SessionId },
    SessionFinished {
        session_id: SessionId,
        profile: ProfileName,
        status: SyncStatus,
    },

    StorageReleased { storages: Vec<StorageName> },

    SyncOnChangePending { profile: ProfileName },
    SyncOnChangeFired { profile: ProfileName },
    /// A pending sync-on-change timer was preempted by a manual/scheduled
    /// start before it fired; clears the same pending marker `Fired` would
    /// have, without claiming the debounce actually elapsed.
    SyncOnChangeCancelled { profile: ProfileName },

    Shutdown,
}

impl Event {
    /// Short event name for log spans, mirroring how the engine's `Effect`
    /// names itself for structured logging.
    pub fn name(&self) -> &'static str {
        match self {
            Event::ProfileChanged { .. } => "profile_changed",
            Event::SyncStatus { .. } => "sync_status",
            Event::ResultsAvailable { .. } => "results_available",
            Event::TransferProgress { .. } => "transfer_progress",
            Event::BackupInProgress => "backup_in_progress",
            Event::BackupDone => "backup_done",
            Event::RestoreInProgress => "restore_in_progress",
            Event::RestoreDone => "restore_done",
            Event::SyncedExternallyStatus { .. } => "synced_externally_status",
            Event::StatusChanged { .. } => "status_changed",
            Event::AlarmFired { .. } => "alarm_fired",
            Event::TimerFired { .. } => "timer_fired",
            Event::ConnectivityChanged { .. } => "connectivity_changed",
            Event::SessionQueued { .. } => "session_queued",
            Event::SessionReserved { .. } => "session_reserved",
            Event::SessionStarting { .. } => "session_starting",
            Event::SessionRunning { .. } => "session_running",
            Event::SessionFinished { .. } => "session_finished",
            Event::StorageReleased { .. } => "storage_released",
            Event::SyncOnChangePending { .. } => "sync_on_change_pending",
            Event::SyncOnChangeFired { .. } => "sync_on_change_fired",
            Event::SyncOnChangeCancelled { .. } => "sync_on_change_cancelled",
            Event::Shutdown => "shutdown",
        }
    }

    /// The profile this event is about, if any; used to scope per-profile
    /// log files and to key WAL replay bookkeeping.
    pub fn profile(&self) -> Option<&ProfileName> {
        match self {
            Event::ProfileChanged { profile, .. }
            | Event::SyncStatus { profile, .. }
            | Event::ResultsAvailable { profile, .. }
            | Event::TransferProgress { profile, .. }
            | Event::AlarmFired { profile, .. }
            | Event::SessionQueued { profile, .. }
            | Event::SessionFinished { profile, .. }
            | Event::SyncOnChangePending { profile }
            | Event::SyncOnChangeFired { profile }
            | Event::SyncOnChangeCancelled { profile } => Some(profile),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
