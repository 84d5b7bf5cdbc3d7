// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects: the side-effecting actions the executor carries out on behalf of
//! the orchestrator. Pure state mutation never appears here; only things
//! that cross a process, thread, OS-timer, or database boundary do.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::profile::{ClientProfileName, ProfileName, StorageName};
use crate::session::{SessionDirection, SessionId};
use crate::timer::TimerId;

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (d.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Which of the four one-shot backup/restore signals (§4.6) a drain/resume
/// completion resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupReplyKind {
    BackupStart,
    BackupDone,
    RestoreStart,
    RestoreDone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Effect {
    /// Append a domain event to the write-ahead log.
    Emit { event: Event },

    /// Launch the plugin runner process for a reserved session.
    SpawnPluginRunner {
        session_id: SessionId,
        profile: ProfileName,
        client_profile_name: ClientProfileName,
        storages: Vec<StorageName>,
        direction: SessionDirection,
    },

    /// Ask a running plugin runner to stop; its eventual completion event
    /// (CANCELLED or ABORTED) drives cleanup. There is no forced kill path —
    /// a plugin that never completes leaves its session RUNNING by design.
    StopPluginRunner { session_id: SessionId },

    /// Persist a new armed wake-up for `profile` to the alarm store.
    PersistAlarm {
        profile: ProfileName,
        fire_at: std::time::SystemTime,
    },

    /// Remove any armed alarm for `profile` (fired, superseded, or disabled).
    DeleteAlarm { profile: ProfileName },

    /// Arm an in-memory timer (rush-switch, SOC debounce, profile-change
    /// coalescing).
    SetTimer {
        id: TimerId,
        #[serde(with = "duration_millis")]
        duration: Duration,
    },

    CancelTimer { id: TimerId },

    CancelTimersWithPrefix { prefix: String },

    /// Resolve a delayed backup/restore reply once the drain or resume this
    /// signal was waiting on has completed.
    ResolveBackupReply { kind: BackupReplyKind },

    /// Best-effort desktop/user notification; failures are logged, never
    /// propagated (ambient concern, not core policy).
    Notify { title: String, message: String },
}

impl Effect {
    /// Name used for the tracing span wrapping execution, mirroring the
    /// engine's `Effect::name()`/`fields()` split between label and payload.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Emit { .. } => "emit",
            Effect::SpawnPluginRunner { .. } => "spawn_plugin_runner",
            Effect::StopPluginRunner { .. } => "stop_plugin_runner",
            Effect::PersistAlarm { .. } => "persist_alarm",
            Effect::DeleteAlarm { .. } => "delete_alarm",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
            Effect::CancelTimersWithPrefix { .. } => "cancel_timers_with_prefix",
            Effect::ResolveBackupReply { .. } => "resolve_backup_reply",
            Effect::Notify { .. } => "notify",
        }
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit { event } => vec![("event", event.name().to_string())],
            Effect::SpawnPluginRunner {
                session_id,
                profile,
                client_profile_name,
                ..
            } => vec![
                ("session_id", session_id.to_string()),
                ("profile", profile.to_string()),
                ("client_profile", client_profile_name.to_string()),
            ],
            Effect::StopPluginRunner { session_id } => {
                vec![("session_id", session_id.to_string())]
            }
            Effect::PersistAlarm { profile, .. } => vec![("profile", profile.to_string())],
            Effect::DeleteAlarm { profile } => vec![("profile", profile.to_string())],
            Effect::SetTimer { id, duration } => vec![
                ("timer_id", id.to_string()),
                ("duration_ms", duration.as_millis().to_string()),
            ],
            Effect::CancelTimer { id } => vec![("timer_id", id.to_string())],
            Effect::CancelTimersWithPrefix { prefix } => vec![("prefix", prefix.clone())],
            Effect::ResolveBackupReply { kind } => vec![("kind", format!("{kind:?}"))],
            Effect::Notify { title, .. } => vec![("title", title.clone())],
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
