// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between `syncd` and its local clients.
//!
//! Everything the protocol moves is a thin, tagged JSON record over the
//! wire format in [`protocol_wire`]. Requests name the operations
//! `Synchronizer` exposes (§4.4); profile-store XML parsing, D-Bus
//! transport, and accounts-framework plumbing that would normally sit in
//! front of this protocol are out of scope — any local process that can
//! connect to the socket and speak this JSON is a valid client.

#[path = "protocol_wire.rs"]
mod protocol_wire;

pub use protocol_wire::{decode, encode, read_message, read_request, write_message, write_response, ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION};

use serde::{Deserialize, Serialize};
use syncd_core::{BackupReplyKind, InternetType, MinorCode, ProfileChangeKind, SyncStatus};

/// A request sent from a client to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Liveness probe.
    Ping,
    /// Protocol handshake.
    Hello { version: String },
    /// Daemon status summary.
    Status,
    /// Graceful shutdown.
    Shutdown,

    /// Manual sync start (`start(profile)`, §4.4).
    Start { profile: String },
    /// Scheduler-driven start, subject to connectivity/power policy
    /// (`startScheduled(profile)`, §4.4).
    StartScheduled { profile: String },
    /// Abort an in-flight or queued session for a profile (§4.4).
    Abort { profile: String },

    /// A plugin runner reported completion for a session (§4.4).
    SessionFinished {
        session_id: String,
        status: SyncStatus,
        message: Option<String>,
        minor_code: Option<MinorCode>,
    },

    /// The profile store changed on disk (§4.4). Profile XML parsing
    /// itself is out of scope; the caller resolves a change to a profile
    /// name and a kind before calling in.
    ProfileChanged { profile: String, kind: ProfileChangeKind },

    /// Transport connectivity changed (§4.4, §4.7).
    ConnectivityChanged { online: bool, internet_type: InternetType },

    /// Device backup/restore started (§4.6).
    BackupStart { kind: BackupReplyKind },
    /// Device backup/restore finished (§4.6).
    BackupFinish { kind: BackupReplyKind },

    /// Re-evaluate (and, on an explicit query, always emit) externally-
    /// synced status for one profile (§4.7).
    RefreshExternalSync { profile: String, force: bool },
}

/// A response sent from the daemon to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Pong,
    Hello { version: String },
    Status(DaemonStatus),
    ShuttingDown,
    Error { message: String },
}

/// Point-in-time snapshot of daemon state, returned by `Request::Status`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DaemonStatus {
    pub version: String,
    pub uptime_secs: u64,
    pub profile_count: usize,
    pub active_sessions: usize,
    pub queued_sessions: usize,
    pub backup_active: bool,
    pub waiting_for_online: usize,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
