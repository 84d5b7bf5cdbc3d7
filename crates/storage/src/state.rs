// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use syncd_core::{
    ClientProfileName, Event, Profile, ProfileName, SessionState, StorageName, SyncSession,
};

/// Materialized state built from replaying the event log.
///
/// Mirrors the set of things the orchestrator needs to recover after a
/// restart: the profile table, in-flight/queued sessions, the storage
/// booker's reservation map, and the bookkeeping sets named in the data
/// model invariants (waiting-for-online, external-sync status).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub profiles: HashMap<String, Profile>,
    pub sessions: HashMap<String, SyncSession>,
    /// FIFO order of queued (not yet reserved) session ids.
    #[serde(default)]
    pub session_queue: Vec<String>,
    /// storage name -> owning client profile name, per the booker invariant
    /// that a storage is held by at most one session at a time.
    #[serde(default)]
    pub reserved_storages: HashMap<String, String>,
    #[serde(default)]
    pub waiting_for_online: HashSet<String>,
    /// profileName -> isExternallySynced, per ExternalSyncRegistry (§4.7).
    #[serde(default)]
    pub externally_synced: HashMap<String, bool>,
    /// Profiles with a pending sync-on-change debounce timer armed.
    #[serde(default)]
    pub sync_on_change_pending: HashSet<String>,
    #[serde(default)]
    pub backup_active: bool,
}

impl MaterializedState {
    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn get_session(&self, id: &str) -> Option<&SyncSession> {
        self.sessions.get(id)
    }

    /// Sessions that have reserved storages and are running a plugin runner.
    pub fn active_sessions(&self) -> impl Iterator<Item = &SyncSession> {
        self.sessions.values().filter(|s| {
            matches!(
                s.state,
                SessionState::Reserved | SessionState::Starting | SessionState::Running
            )
        })
    }

    /// Whether any active session already uses this client profile name,
    /// enforcing invariant 2 (client-type exclusivity).
    pub fn client_type_active(&self, client_profile_name: &ClientProfileName) -> bool {
        self.active_sessions()
            .any(|s| s.client_profile_name() == client_profile_name)
    }

    pub fn reserved_storage_names(&self) -> BTreeSet<StorageName> {
        self.reserved_storages
            .keys()
            .map(|k| StorageName::new(k.as_str()))
            .collect()
    }

    /// Apply a domain event to derive the next state.
    ///
    /// All handlers are idempotent: replaying the same event twice must
    /// leave state identical to replaying it once.
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::ProfileChanged { profile, kind } => match kind {
                syncd_core::ProfileChangeKind::Removed => {
                    self.profiles.remove(profile.as_str());
                    self.waiting_for_online.remove(profile.as_str());
                    self.externally_synced.remove(profile.as_str());
                    self.sync_on_change_pending.remove(profile.as_str());
                }
                syncd_core::ProfileChangeKind::Added | syncd_core::ProfileChangeKind::Modified => {
                    self.profiles
                        .entry(profile.as_str().to_string())
                        .or_insert_with(|| Profile::new(profile.as_str(), ""));
                }
            },

            Event::SessionQueued { session_id, profile } => {
                if let Some(p) = self.profiles.get(profile.as_str()) {
                    let session = SyncSession::new(
                        session_id.clone(),
                        p.clone(),
                        syncd_core::SessionDirection::Outbound,
                        true,
                    );
                    self.sessions
                        .entry(session_id.as_str().to_string())
                        .or_insert(session);
                }
                let id = session_id.as_str().to_string();
                if !self.session_queue.contains(&id) {
                    self.session_queue.push(id);
                }
            }

            Event::SessionReserved { session_id } => {
                self.session_queue.retain(|id| id != session_id.as_str());
                if let Some(session) = self.sessions.get_mut(session_id.as_str()) {
                    if session.transition(SessionState::Reserved) {
                        for storage in session.reserved_storages.clone() {
                            self.reserved_storages.insert(
                                storage.as_str().to_string(),
                                session.client_profile_name().as_str().to_string(),
                            );
                        }
                    }
                }
            }

            Event::SessionStarting { session_id } => {
                if let Some(session) = self.sessions.get_mut(session_id.as_str()) {
                    session.transition(SessionState::Starting);
                }
            }

            Event::SessionRunning { session_id } => {
                if let Some(session) = self.sessions.get_mut(session_id.as_str()) {
                    session.transition(SessionState::Running);
                }
            }

            Event::SessionFinished {
                session_id,
                profile,
                status,
            } => {
                let next_state = match status.is_terminal() {
                    true => terminal_session_state(*status),
                    false => None,
                };
                if let (Some(session), Some(next)) =
                    (self.sessions.get_mut(session_id.as_str()), next_state)
                {
                    session.transition(next);
                }
                self.session_queue.retain(|id| id != session_id.as_str());
                self.sessions.remove(session_id.as_str());
                if let Some(p) = self.profiles.get_mut(profile.as_str()) {
                    p.last_sync_time = Some(std::time::SystemTime::now());
                    match status {
                        syncd_core::SyncStatus::Done => {
                            p.last_successful_sync_time = p.last_sync_time;
                            p.retry_count = 0;
                        }
                        syncd_core::SyncStatus::Error => {
                            p.retry_count = p.retry_count.saturating_add(1);
                        }
                        _ => {}
                    }
                }
            }

            Event::StorageReleased { storages } => {
                for storage in storages {
                    self.reserved_storages.remove(storage.as_str());
                }
            }

            Event::ConnectivityChanged { online, .. } => {
                if *online {
                    // Draining waiting_for_online is driven by the
                    // synchronizer; the materialized set is cleared
                    // per-profile as SessionQueued events land for them.
                }
            }

            Event::SyncOnChangePending { profile } => {
                self.sync_on_change_pending
                    .insert(profile.as_str().to_string());
            }

            Event::SyncOnChangeFired { profile } | Event::SyncOnChangeCancelled { profile } => {
                self.sync_on_change_pending.remove(profile.as_str());
            }

            Event::BackupInProgress | Event::RestoreInProgress => {
                self.backup_active = true;
            }

            Event::BackupDone | Event::RestoreDone => {
                self.backup_active = false;
            }

            Event::SyncedExternallyStatus {
                profile,
                externally_synced,
                ..
            } => {
                self.externally_synced.insert(profile.as_str().to_string(), *externally_synced);
            }

            // Events that carry no persisted-state side effects: progress
            // streams, alarm/timer bookkeeping (owned by the scheduler's
            // own store), and process-level signals.
            Event::SyncStatus { .. }
            | Event::ResultsAvailable { .. }
            | Event::TransferProgress { .. }
            | Event::StatusChanged { .. }
            | Event::AlarmFired { .. }
            | Event::TimerFired { .. }
            | Event::Shutdown => {}
        }
    }

    /// Mark `profile` as waiting for connectivity before it can start.
    pub fn add_waiting_for_online(&mut self, profile: &ProfileName) {
        self.waiting_for_online.insert(profile.as_str().to_string());
    }

    pub fn remove_waiting_for_online(&mut self, profile: &ProfileName) {
        self.waiting_for_online.remove(profile.as_str());
    }
}

fn terminal_session_state(status: syncd_core::SyncStatus) -> Option<SessionState> {
    use syncd_core::SyncStatus as S;
    match status {
        S::Done => Some(SessionState::Done),
        S::Error | S::NotPossible => Some(SessionState::Error),
        S::Cancelled => Some(SessionState::Cancelled),
        S::Aborted => Some(SessionState::Aborted),
        _ => None,
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
