// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory plugin runner for tests: records spawn/stop calls and lets the
//! test drive completion explicitly instead of waiting on a real process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use syncd_core::{Event, SessionId};

use super::{PluginHandle, PluginRunner, PluginRunnerError, PluginSpawnConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum PluginCall {
    Spawn(PluginSpawnConfig),
    Stop(SessionId),
}

#[derive(Clone, Default)]
pub struct FakePluginRunner {
    calls: Arc<Mutex<Vec<PluginCall>>>,
    senders: Arc<Mutex<HashMap<SessionId, mpsc::Sender<Event>>>>,
}

impl FakePluginRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PluginCall> {
        self.calls.lock().clone()
    }

    /// Deliver `event` as if the spawned runner for `session_id` produced it.
    /// Panics (in test code only) if no runner was spawned for that session.
    pub async fn complete(&self, session_id: &SessionId, event: Event) {
        let sender = self
            .senders
            .lock()
            .get(session_id)
            .cloned()
            .expect("complete() called for a session that was never spawned");
        sender.send(event).await.expect("test event receiver dropped");
    }
}

#[async_trait]
impl PluginRunner for FakePluginRunner {
    async fn spawn(
        &self,
        config: PluginSpawnConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<PluginHandle, PluginRunnerError> {
        let session_id = config.session_id.clone();
        self.senders.lock().insert(session_id.clone(), event_tx);
        self.calls.lock().push(PluginCall::Spawn(config));
        Ok(PluginHandle {
            session_id,
            pid: None,
        })
    }

    async fn stop(&self, session_id: &SessionId) -> Result<(), PluginRunnerError> {
        if !self.senders.lock().contains_key(session_id) {
            return Err(PluginRunnerError::NotFound(session_id.clone()));
        }
        self.calls.lock().push(PluginCall::Stop(session_id.clone()));
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
