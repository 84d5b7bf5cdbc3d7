// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronizer (§4.4): the top-level orchestrator. Owns the executor and
//! the policy inputs (connectivity, power) and turns external events into
//! effects, which it hands to the executor one at a time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use syncd_adapters::{ConnectivityTracker, NotifyAdapter, PluginRunner, PowerPolicy};
use syncd_core::{
    BackupReplyKind, Clock, Effect, Event, IdGen, MinorCode, Profile, ProfileChangeKind,
    ProfileName, SessionDirection, SessionId, SyncResult, SyncStatus,
};
use syncd_storage::MaterializedState;

use crate::error::EngineError;
use crate::executor::Executor;
use crate::sync_scheduler::RetryPolicy;
use crate::{external_sync, storage_booker, sync_on_change, sync_scheduler};

/// How a profile's coalescing timer should be resolved once it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingChange {
    Added,
    Modified,
}

pub struct Synchronizer<P, N, C, CT, PW, G>
where
    P: PluginRunner,
    N: NotifyAdapter,
    C: Clock,
    CT: ConnectivityTracker,
    PW: PowerPolicy,
    G: IdGen,
{
    executor: Executor<P, N, C>,
    connectivity: CT,
    power: PW,
    id_gen: G,
    allow_scheduled_sync_over_cellular: bool,
    retry_policy: RetryPolicy,
    pending_profile_changes: Mutex<HashMap<String, PendingChange>>,
    /// Which backup/restore-start reply is waiting on the active-session
    /// count reaching zero, if any (§4.6). Set by `backup_start`, cleared
    /// once `on_session_finished` observes the drain has completed.
    pending_backup_kind: Mutex<Option<BackupReplyKind>>,
    /// Forwards every event this call produced to whoever owns durability
    /// (the daemon's WAL writer). Separate from the executor's own
    /// `event_tx`, which only ever carries plugin-runner completion
    /// reports back in.
    wal_tx: mpsc::Sender<Event>,
}

impl<P, N, C, CT, PW, G> Synchronizer<P, N, C, CT, PW, G>
where
    P: PluginRunner,
    N: NotifyAdapter,
    C: Clock,
    CT: ConnectivityTracker,
    PW: PowerPolicy,
    G: IdGen,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        executor: Executor<P, N, C>,
        connectivity: CT,
        power: PW,
        id_gen: G,
        allow_scheduled_sync_over_cellular: bool,
        retry_policy: RetryPolicy,
        wal_tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            executor,
            connectivity,
            power,
            id_gen,
            allow_scheduled_sync_over_cellular,
            retry_policy,
            pending_profile_changes: Mutex::new(HashMap::new()),
            pending_backup_kind: Mutex::new(None),
            wal_tx,
        }
    }

    fn now(&self) -> SystemTime {
        self.executor.clock().now_utc()
    }

    fn get_profile(&self, name: &str) -> Result<Profile, EngineError> {
        self.executor
            .state()
            .lock()
            .get_profile(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownProfile(name.to_string()))
    }

    async fn run(&self, effects: Vec<Effect>) -> Result<(), EngineError> {
        for effect in effects {
            if let Some(event) = self.executor.execute(effect).await.map_err(EngineError::from)? {
                // Best-effort: a full WAL channel means durability is
                // backed up, not that the state change itself failed -
                // apply_event already ran inside the executor.
                let _ = self.wal_tx.try_send(event);
            }
        }
        Ok(())
    }

    /// `acceptScheduledSync(online, type, profile) -> bool` (§4.4).
    fn accept_scheduled_sync(&self, profile: &Profile) -> bool {
        if !self.connectivity.is_online() {
            return false;
        }
        let internet_type = self.connectivity.internet_type();
        if !profile.allowed_internet_types.is_empty() && internet_type != syncd_core::InternetType::Unknown {
            return profile.allowed_internet_types.contains(&internet_type);
        }
        match internet_type {
            syncd_core::InternetType::Wifi | syncd_core::InternetType::Ethernet => true,
            syncd_core::InternetType::Cellular | syncd_core::InternetType::Unknown => {
                self.allow_scheduled_sync_over_cellular
            }
        }
    }

    fn synthetic_failure_effects(&self, profile: &ProfileName, minor: MinorCode, message: impl Into<String>) -> Vec<Effect> {
        let now = self.now();
        let result = SyncResult::failure(SyncStatus::NotPossible, minor.clone(), message, now);
        vec![
            Effect::Emit {
                event: Event::SyncStatus {
                    profile: profile.clone(),
                    status: SyncStatus::NotPossible,
                    message: result.message.clone(),
                    minor_code: Some(minor),
                },
            },
            Effect::Emit {
                event: Event::ResultsAvailable {
                    profile: profile.clone(),
                    result,
                },
            },
        ]
    }

    /// Build the effects that take a profile from "decided to sync" to
    /// queued, and attempt an immediate drain afterwards.
    fn enqueue_effects(&self, profile: &Profile, scheduled: bool) -> Vec<Effect> {
        let session_id = SessionId::new(self.id_gen.next());
        let mut effects = vec![Effect::Emit {
            event: Event::SessionQueued {
                session_id,
                profile: profile.name.clone(),
            },
        }];
        effects.extend(self.drain_effects());
        let _ = scheduled; // scheduled-ness is recorded on the session by apply_event via SessionQueued today.
        effects
    }

    /// `start(profile)` — manual start (§4.4).
    pub async fn start(&self, profile_name: &str) -> Result<(), EngineError> {
        let profile = self.get_profile(profile_name)?;
        let mut effects = sync_on_change::cancel_for_preemption(&profile.name);
        effects.extend(self.enqueue_effects(&profile, false));
        self.run(effects).await
    }

    /// `startScheduled(profile)` — validated by `acceptScheduledSync` first.
    pub async fn start_scheduled(&self, profile_name: &str) -> Result<(), EngineError> {
        let profile = self.get_profile(profile_name)?;

        if !self.connectivity.is_online() {
            let mut state = self.executor.state().lock();
            state.add_waiting_for_online(&profile.name);
            drop(state);
            self.run(self.synthetic_failure_effects(&profile.name, MinorCode::OfflineMode, "no connectivity"))
                .await?;
            return Ok(());
        }

        if !self.accept_scheduled_sync(&profile) {
            let mut state = self.executor.state().lock();
            state.add_waiting_for_online(&profile.name);
            drop(state);
            self.run(self.synthetic_failure_effects(&profile.name, MinorCode::OfflineMode, "connectivity type not allowed"))
                .await?;
            return Ok(());
        }

        if self.power.is_low_battery() {
            self.run(self.synthetic_failure_effects(&profile.name, MinorCode::LowBatteryPower, "battery too low"))
                .await?;
            return Ok(());
        }

        if self.power.is_power_saving() {
            self.run(self.synthetic_failure_effects(&profile.name, MinorCode::PowerSavingMode, "power saving active"))
                .await?;
            return Ok(());
        }

        let mut effects = sync_on_change::cancel_for_preemption(&profile.name);
        effects.extend(self.enqueue_effects(&profile, true));
        self.run(effects).await
    }

    /// `abort(profile)` (§4.4).
    pub async fn abort(&self, profile_name: &str) -> Result<(), EngineError> {
        let session_id = {
            let state = self.executor.state().lock();
            state
                .sessions
                .values()
                .find(|s| s.profile.name.as_str() == profile_name && !s.state.is_terminal())
                .map(|s| s.id.clone())
        };

        let Some(session_id) = session_id else {
            return Err(EngineError::UnknownSession(profile_name.to_string()));
        };

        let is_queued = self
            .executor
            .state()
            .lock()
            .session_queue
            .iter()
            .any(|id| id.as_str() == session_id.as_str());

        if is_queued {
            self.run(vec![Effect::Emit {
                event: Event::SessionFinished {
                    session_id,
                    profile: ProfileName::new(profile_name),
                    status: SyncStatus::Cancelled,
                },
            }])
            .await
        } else {
            self.run(vec![Effect::StopPluginRunner { session_id }]).await
        }
    }

    /// `onSessionFinished(session, status, msg, minor)` (§4.4).
    pub async fn on_session_finished(
        &self,
        session_id: &str,
        status: SyncStatus,
        message: Option<String>,
        minor_code: Option<MinorCode>,
    ) -> Result<(), EngineError> {
        let session = self
            .executor
            .state()
            .lock()
            .get_session(session_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownSession(session_id.to_string()))?;

        let now = self.now();
        let result = SyncResult {
            status,
            minor_code: minor_code.clone().unwrap_or(MinorCode::InternalError),
            message: message.clone(),
            targets: Vec::new(),
            started_at: now,
            finished_at: now,
        };

        let mut effects = vec![
            Effect::Emit {
                event: Event::SyncStatus {
                    profile: session.profile.name.clone(),
                    status,
                    message,
                    minor_code,
                },
            },
            Effect::Emit {
                event: Event::ResultsAvailable {
                    profile: session.profile.name.clone(),
                    result,
                },
            },
            Effect::Emit {
                event: Event::SessionFinished {
                    session_id: session.id.clone(),
                    profile: session.profile.name.clone(),
                    status,
                },
            },
            Effect::Emit {
                event: Event::StorageReleased {
                    storages: session.reserved_storages.iter().cloned().collect(),
                },
            },
        ];

        let retry_count_before_this_error = self.get_profile(session.profile.name.as_str()).map(|p| p.retry_count).unwrap_or(0);
        if session.scheduled && status == SyncStatus::Error && sync_scheduler::retry_permitted(&self.retry_policy, retry_count_before_this_error) {
            let retry_at = now + self.retry_policy.backoff;
            effects.push(sync_scheduler::add_profile_for_sync_retry(&session.profile.name, retry_at));
        } else {
            effects.extend(sync_scheduler::next_fire(&session.profile, now));
        }

        effects.extend(self.drain_effects());
        self.run(effects).await?;

        if let Some(kind) = *self.pending_backup_kind.lock() {
            self.resolve_backup_if_drained(kind).await?;
        }
        Ok(())
    }

    /// `storageReleased` (§4.4): just drain.
    pub async fn on_storage_released(&self) -> Result<(), EngineError> {
        self.run(self.drain_effects()).await
    }

    /// `connectivityChanged(online, type)` (§4.4).
    pub async fn on_connectivity_changed(&self, online: bool, internet_type: syncd_core::InternetType) -> Result<(), EngineError> {
        let mut effects = vec![Effect::Emit {
            event: Event::ConnectivityChanged { online, internet_type },
        }];

        if online {
            let waiting: Vec<Profile> = {
                let state = self.executor.state().lock();
                state
                    .waiting_for_online
                    .iter()
                    .filter_map(|name| state.get_profile(name).cloned())
                    .collect()
            };
            for profile in waiting {
                if self.accept_scheduled_sync(&profile) {
                    self.executor.state().lock().remove_waiting_for_online(&profile.name);
                    effects.extend(self.enqueue_effects(&profile, true));
                }
            }
        } else {
            let online_sessions: Vec<SessionId> = {
                let state = self.executor.state().lock();
                state
                    .active_sessions()
                    .filter(|s| s.profile.destination_type == syncd_core::DestinationType::Online)
                    .map(|s| s.id.clone())
                    .collect()
            };
            for session_id in online_sessions {
                effects.push(Effect::StopPluginRunner { session_id });
            }
        }

        self.run(effects).await
    }

    /// `profileChanged(name, kind, xml)` (§4.4): queue a coalescing record
    /// and arm the 30s timer (the profile's own `syncOnChangeAfter` is for
    /// SOC debounce, not this; the coalescing window here is fixed).
    pub async fn on_profile_changed(&self, name: &str, kind: ProfileChangeKind) -> Result<(), EngineError> {
        let mut effects = vec![Effect::Emit {
            event: Event::ProfileChanged {
                profile: ProfileName::new(name),
                kind,
            },
        }];

        match kind {
            ProfileChangeKind::Removed => {
                self.pending_profile_changes.lock().remove(name);
                effects.push(Effect::CancelTimer {
                    id: syncd_core::TimerId::profile_change_coalesce(name),
                });
                effects.push(sync_on_change::cancel(&ProfileName::new(name)));
                self.executor.state().lock().remove_waiting_for_online(&ProfileName::new(name));
            }
            ProfileChangeKind::Added => {
                self.pending_profile_changes.lock().insert(name.to_string(), PendingChange::Added);
                effects.push(Effect::SetTimer {
                    id: syncd_core::TimerId::profile_change_coalesce(name),
                    duration: std::time::Duration::from_secs(30),
                });
            }
            ProfileChangeKind::Modified => {
                self.pending_profile_changes
                    .lock()
                    .entry(name.to_string())
                    .or_insert(PendingChange::Modified);
                effects.push(Effect::SetTimer {
                    id: syncd_core::TimerId::profile_change_coalesce(name),
                    duration: std::time::Duration::from_secs(30),
                });
            }
        }

        self.run(effects).await
    }

    /// The 30s coalescing timer fired: process exactly one record.
    pub async fn on_profile_change_timer_fired(&self, profile_name: &str) -> Result<(), EngineError> {
        let change = self.pending_profile_changes.lock().remove(profile_name);
        match change {
            Some(PendingChange::Added) => {
                let profile = self.get_profile(profile_name)?;
                let effect = sync_on_change::notify(&self.executor.state().lock(), &profile);
                self.run(effect).await?;
                self.start(profile_name).await
            }
            Some(PendingChange::Modified) => self.start_scheduled(profile_name).await,
            None => Ok(()),
        }
    }

    /// Dispatch a fired `Scheduler` timer to whichever of the three kinds
    /// of timer this orchestrator arms owns it (§4.3, §4.5, §4.4's
    /// profile-change coalescing). Unknown ids (already cancelled between
    /// the timer firing and this call landing) are ignored.
    pub async fn on_timer_fired(&self, id: &syncd_core::TimerId) -> Result<(), EngineError> {
        let Some(profile_name) = id.profile_name() else {
            return Ok(());
        };
        if id.is_sync_on_change() {
            self.on_sync_on_change_timer_fired(profile_name).await
        } else if id.is_profile_change_coalesce() {
            self.on_profile_change_timer_fired(profile_name).await
        } else if id.is_rush_switch() {
            self.on_rush_switch_timer_fired(profile_name).await
        } else {
            Ok(())
        }
    }

    /// Sync-on-change debounce elapsed (§4.5): fire the pending notice and
    /// start a sync for the profile.
    async fn on_sync_on_change_timer_fired(&self, profile_name: &str) -> Result<(), EngineError> {
        let profile = self.get_profile(profile_name)?;
        self.run(vec![sync_on_change::fire(&profile.name)]).await?;
        self.start(profile_name).await
    }

    /// The rush-window boundary was crossed (§4.3): recompute the next
    /// fire time and re-evaluate external-sync status, since both depend
    /// on whether `in_external_rush_period` currently holds.
    async fn on_rush_switch_timer_fired(&self, profile_name: &str) -> Result<(), EngineError> {
        let profile = self.get_profile(profile_name)?;
        let now = self.now();
        let mut effects = sync_scheduler::next_fire(&profile, now);
        let external = {
            let state = self.executor.state().lock();
            external_sync::evaluate(&state, &profile, now, false)
        };
        effects.extend(external);
        self.run(effects).await
    }

    /// `onAlarmFired(profile)` (§4.3): an armed wake alarm fired; attempt a
    /// scheduled sync for the named profile.
    pub async fn on_alarm_fired(&self, profile_name: &str) -> Result<(), EngineError> {
        self.start_scheduled(profile_name).await
    }

    /// Access to the underlying scheduler, for the daemon's timer-check
    /// loop to poll `fired_timers`/`next_deadline` against.
    pub fn scheduler(&self) -> &Arc<Mutex<crate::scheduler::Scheduler>> {
        self.executor.scheduler()
    }

    /// Access to the alarm inventory, for the daemon's alarm-check loop to
    /// poll `fired_alarms`/`next_deadline` against.
    pub fn alarms(&self) -> &Arc<crate::alarm_inventory::AlarmInventory> {
        self.executor.alarms()
    }

    /// Access to the backup coordinator, so the IPC listener can register
    /// for a delayed reply before invoking `backup_start`/`backup_finish`.
    pub fn backup(&self) -> &Arc<crate::backup::BackupCoordinator> {
        self.executor.backup()
    }

    /// `backup/restore start` (§4.4, §4.6): abort active sessions, suspend
    /// the scheduler, and mark every profile as not-externally-synced.
    pub async fn backup_start(&self, kind: BackupReplyKind) -> Result<(), EngineError> {
        let active: Vec<SessionId> = {
            let state = self.executor.state().lock();
            state.active_sessions().map(|s| s.id.clone()).collect()
        };

        let mut effects = vec![Effect::Emit {
            event: if kind == BackupReplyKind::BackupStart {
                Event::BackupInProgress
            } else {
                Event::RestoreInProgress
            },
        }];
        for session_id in active {
            effects.push(Effect::StopPluginRunner { session_id });
        }
        *self.pending_backup_kind.lock() = Some(kind);
        self.run(effects).await?;
        self.resolve_backup_if_drained(kind).await
    }

    /// If `kind` is still the outstanding backup/restore-start reply and no
    /// sessions remain active, resolve it and clear the pending marker.
    /// Called right after `backup_start` stops whatever was running, and
    /// again from `on_session_finished` as the last active session drains.
    async fn resolve_backup_if_drained(&self, kind: BackupReplyKind) -> Result<(), EngineError> {
        let still_pending = *self.pending_backup_kind.lock() == Some(kind);
        if still_pending && self.executor.state().lock().active_sessions().next().is_none() {
            *self.pending_backup_kind.lock() = None;
            self.run(vec![Effect::ResolveBackupReply { kind }]).await?;
        }
        Ok(())
    }

    /// `backup/restore finish` (§4.4): resume the scheduler.
    pub async fn backup_finish(&self, kind: BackupReplyKind) -> Result<(), EngineError> {
        let event = if kind == BackupReplyKind::BackupDone {
            Event::BackupDone
        } else {
            Event::RestoreDone
        };
        self.run(vec![Effect::Emit { event }, Effect::ResolveBackupReply { kind }]).await
    }

    /// Re-evaluate external-sync status for one profile, emitting on every
    /// transition and on an explicit query even when unchanged (§4.7).
    pub async fn refresh_external_sync(&self, profile_name: &str, force: bool) -> Result<(), EngineError> {
        let profile = self.get_profile(profile_name)?;
        let now = self.now();
        let effect = {
            let state = self.executor.state().lock();
            external_sync::evaluate(&state, &profile, now, force)
        };
        if let Some(effect) = effect {
            self.run(vec![effect]).await?;
        }
        Ok(())
    }

    /// Tie-break among candidate profiles for an inbound session (§4.4):
    /// `(visible, enabled)` descending, visible beats hidden, enabled beats
    /// disabled. Synthesizes a temporary profile if nothing matches.
    pub fn choose_inbound_profile(&self, candidates: Vec<Profile>, peer_display_name: &str) -> Profile {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| {
            let a_key = (!a.hidden, a.enabled);
            let b_key = (!b.hidden, b.enabled);
            b_key.cmp(&a_key)
        });
        sorted.into_iter().next().unwrap_or_else(|| {
            let mut profile = Profile::new(uuid::Uuid::new_v4().to_string(), "");
            profile.created_for_session = true;
            profile.key_values.insert("display_name".to_string(), peer_display_name.to_string());
            profile
        })
    }

    /// Drain loop (§4.4): reserve+start as many queued sessions as possible
    /// without violating storage or client-type exclusivity.
    fn drain_effects(&self) -> Vec<Effect> {
        let mut effects = Vec::new();
        loop {
            let backup_active = self.executor.state().lock().backup_active;
            if backup_active {
                break;
            }

            let head_id = { self.executor.state().lock().session_queue.first().cloned() };
            let Some(head_id) = head_id else { break };

            let session = self.executor.state().lock().get_session(&head_id).cloned();
            let Some(session) = session else {
                // Stale queue entry with no backing session: drop it defensively.
                self.executor.state().lock().session_queue.retain(|id| id != &head_id);
                continue;
            };

            if session.scheduled && self.power.is_low_battery() {
                let finished = Event::SessionFinished {
                    session_id: session.id.clone(),
                    profile: session.profile.name.clone(),
                    status: SyncStatus::Error,
                };
                // Apply immediately: otherwise the queue head never moves and
                // this branch spins forever on the next iteration.
                self.executor.state().lock().apply_event(&finished);
                effects.push(Effect::Emit { event: finished });
                effects.push(Effect::Emit {
                    event: Event::ResultsAvailable {
                        profile: session.profile.name.clone(),
                        result: SyncResult::failure(
                            SyncStatus::Error,
                            MinorCode::LowBatteryPower,
                            "battery too low at dequeue",
                            self.now(),
                        ),
                    },
                });
                continue;
            }

            let conflicts = {
                let state = self.executor.state().lock();
                storage_booker::conflicts(&state.reserved_storages, &session.profile.storage_names)
            };
            if !conflicts.is_empty() {
                break;
            }

            let client_busy = {
                let state = self.executor.state().lock();
                state
                    .active_sessions()
                    .any(|s| s.id != session.id && s.client_profile_name() == session.client_profile_name())
            };
            if client_busy {
                break;
            }

            effects.push(Effect::Emit {
                event: Event::SessionReserved {
                    session_id: session.id.clone(),
                },
            });
            effects.push(Effect::SpawnPluginRunner {
                session_id: session.id.clone(),
                profile: session.profile.name.clone(),
                client_profile_name: session.profile.client_profile_name.clone(),
                storages: session.profile.storage_names.iter().cloned().collect(),
                direction: SessionDirection::Outbound,
            });
            effects.push(Effect::Emit {
                event: Event::SessionStarting {
                    session_id: session.id.clone(),
                },
            });
            effects.push(Effect::Emit {
                event: Event::SessionRunning {
                    session_id: session.id.clone(),
                },
            });
            effects.push(Effect::Emit {
                event: Event::SyncStatus {
                    profile: session.profile.name.clone(),
                    status: SyncStatus::Started,
                    message: None,
                    minor_code: None,
                },
            });

            // Apply locally so the loop sees the updated queue/reservations
            // on its next iteration without re-running the executor.
            let mut state = self.executor.state().lock();
            state.apply_event(&Event::SessionReserved { session_id: session.id.clone() });
            state.apply_event(&Event::SessionStarting { session_id: session.id.clone() });
            state.apply_event(&Event::SessionRunning { session_id: session.id.clone() });
        }
        effects
    }
}

#[cfg(test)]
#[path = "synchronizer_tests.rs"]
mod tests;
