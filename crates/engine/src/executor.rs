// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor: carries out the side-effecting actions the orchestrator
//! decided on, each wrapped in a tracing span keyed by `Effect::name()`.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

use syncd_adapters::{NotifyAdapter, PluginRunner, PluginSpawnConfig};
use syncd_core::{Clock, Effect, Event};
use syncd_storage::MaterializedState;

use crate::alarm_inventory::AlarmInventory;
use crate::backup::BackupCoordinator;
use crate::scheduler::Scheduler;

/// Errors that can occur during effect execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("plugin runner error: {0}")]
    PluginRunner(#[from] syncd_adapters::PluginRunnerError),
    #[error("notify error: {0}")]
    Notify(#[from] syncd_adapters::notify::NotifyError),
    #[error("alarm store error: {0}")]
    AlarmStore(#[from] syncd_storage::AlarmStoreError),
}

/// Executes effects using the configured adapters.
pub struct Executor<P, N, C: Clock> {
    plugins: P,
    notifier: N,
    state: Arc<Mutex<MaterializedState>>,
    alarms: Arc<AlarmInventory>,
    scheduler: Arc<Mutex<Scheduler>>,
    backup: Arc<BackupCoordinator>,
    clock: C,
    /// Channel plugin runners deliver `SessionFinished` on once they exit.
    event_tx: mpsc::Sender<Event>,
}

impl<P, N, C> Executor<P, N, C>
where
    P: PluginRunner,
    N: NotifyAdapter,
    C: Clock,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        plugins: P,
        notifier: N,
        state: Arc<Mutex<MaterializedState>>,
        alarms: Arc<AlarmInventory>,
        scheduler: Arc<Mutex<Scheduler>>,
        backup: Arc<BackupCoordinator>,
        clock: C,
        event_tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            plugins,
            notifier,
            state,
            alarms,
            scheduler,
            backup,
            clock,
            event_tx,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> &Arc<Mutex<MaterializedState>> {
        &self.state
    }

    pub fn scheduler(&self) -> &Arc<Mutex<Scheduler>> {
        &self.scheduler
    }

    pub fn alarms(&self) -> &Arc<AlarmInventory> {
        &self.alarms
    }

    pub fn backup(&self) -> &Arc<BackupCoordinator> {
        &self.backup
    }

    /// Execute a single effect with tracing.
    ///
    /// Returns an optional event that should be appended to the WAL and fed
    /// back into the event loop.
    pub async fn execute(&self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        let op_name = effect.name();
        let span = tracing::info_span!("effect", effect = op_name);
        let _guard = span.enter();

        tracing::debug!(fields = ?effect.fields(), "executing");

        let start = std::time::Instant::now();
        let result = self.execute_inner(effect).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(event) => tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, emitted = event.is_some(), "executed"),
            Err(e) => tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, error = %e, "effect failed"),
        }

        result
    }

    pub async fn execute_all(&self, effects: Vec<Effect>) -> Vec<Result<Option<Event>, ExecuteError>> {
        let mut results = Vec::with_capacity(effects.len());
        for effect in effects {
            results.push(self.execute(effect).await);
        }
        results
    }

    async fn execute_inner(&self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        match effect {
            Effect::Emit { event } => {
                self.state.lock().apply_event(&event);
                Ok(Some(event))
            }

            Effect::SpawnPluginRunner {
                session_id,
                profile,
                client_profile_name,
                storages,
                direction,
            } => {
                let config = PluginSpawnConfig {
                    session_id,
                    profile,
                    client_profile_name,
                    storages,
                    direction,
                };
                self.plugins.spawn(config, self.event_tx.clone()).await?;
                Ok(None)
            }

            Effect::StopPluginRunner { session_id } => {
                self.plugins.stop(&session_id).await?;
                Ok(None)
            }

            Effect::PersistAlarm { profile, fire_at } => {
                self.alarms.arm(&profile, fire_at)?;
                Ok(None)
            }

            Effect::DeleteAlarm { profile } => {
                self.alarms.disarm(&profile)?;
                Ok(None)
            }

            Effect::SetTimer { id, duration } => {
                self.scheduler.lock().set_timer(id.as_str().to_string(), duration, self.clock.now());
                Ok(None)
            }

            Effect::CancelTimer { id } => {
                self.scheduler.lock().cancel_timer(id.as_str());
                Ok(None)
            }

            Effect::CancelTimersWithPrefix { prefix } => {
                self.scheduler.lock().cancel_timers_with_prefix(&prefix);
                Ok(None)
            }

            Effect::ResolveBackupReply { kind } => {
                self.backup.resolve(kind);
                Ok(None)
            }

            Effect::Notify { title, message } => {
                if let Err(e) = self.notifier.notify(&title, &message).await {
                    tracing::warn!(error = %e, "notification failed, ignoring (ambient concern)");
                }
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
