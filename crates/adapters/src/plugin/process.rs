// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs the plugin runner as a child process and watches for its exit.
//!
//! The actual runner binary and its storage-specific wire protocol are out
//! of scope; this adapter treats the process boundary generically: a zero
//! exit is DONE, a nonzero exit after a `stop()` request is CANCELLED, and
//! any other nonzero exit is ERROR.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use syncd_core::{Event, SessionId, SyncStatus};

use super::{PluginHandle, PluginRunner, PluginRunnerError, PluginSpawnConfig};

/// Spawns `command` for each reserved session, passing the profile, client
/// profile name, and direction as positional arguments.
#[derive(Clone)]
pub struct ProcessPluginRunner {
    command: Arc<String>,
    stop_signals: Arc<Mutex<HashMap<SessionId, oneshot::Sender<()>>>>,
}

impl ProcessPluginRunner {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: Arc::new(command.into()),
            stop_signals: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl PluginRunner for ProcessPluginRunner {
    async fn spawn(
        &self,
        config: PluginSpawnConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<PluginHandle, PluginRunnerError> {
        let mut cmd = tokio::process::Command::new(self.command.as_str());
        cmd.arg(config.profile.as_str())
            .arg(config.client_profile_name.as_str())
            .arg(format!("{:?}", config.direction));
        cmd.kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| PluginRunnerError::SpawnFailed(e.to_string()))?;
        let pid = child.id();
        let session_id = config.session_id;
        let profile = config.profile;

        let (stop_tx, mut stop_rx) = oneshot::channel();
        self.stop_signals.lock().insert(session_id.clone(), stop_tx);

        let stop_signals = Arc::clone(&self.stop_signals);
        let wait_session_id = session_id.clone();

        tokio::spawn(async move {
            let mut stopped = false;
            let status = tokio::select! {
                status = child.wait() => status,
                _ = &mut stop_rx => {
                    stopped = true;
                    let _ = child.start_kill();
                    child.wait().await
                }
            };
            stop_signals.lock().remove(&wait_session_id);

            let sync_status = match status {
                Ok(exit) if exit.success() => SyncStatus::Done,
                Ok(_) if stopped => SyncStatus::Cancelled,
                _ => SyncStatus::Error,
            };

            let event = Event::SessionFinished {
                session_id: wait_session_id,
                profile,
                status: sync_status,
            };
            if event_tx.send(event).await.is_err() {
                tracing::warn!("plugin runner event receiver dropped before completion");
            }
        });

        Ok(PluginHandle { session_id, pid })
    }

    async fn stop(&self, session_id: &SessionId) -> Result<(), PluginRunnerError> {
        let stop_tx = self
            .stop_signals
            .lock()
            .remove(session_id)
            .ok_or_else(|| PluginRunnerError::NotFound(session_id.clone()))?;
        stop_tx
            .send(())
            .map_err(|_| PluginRunnerError::StopFailed("runner already exited".into()))
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
