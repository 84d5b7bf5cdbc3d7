// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin runner process management.
//!
//! The plugin runner itself (how it talks the storage-specific protocol,
//! how it is packaged and discovered) is out of scope here; this adapter
//! only owns the boundary the orchestrator core needs: start a runner for
//! a reserved session, ask it to stop, and eventually observe that it
//! finished so a terminal `SessionFinished` event can be emitted.

mod process;

pub use process::ProcessPluginRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePluginRunner, PluginCall};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use syncd_core::{ClientProfileName, Event, ProfileName, SessionDirection, SessionId, StorageName};

/// Errors from plugin runner process management.
#[derive(Debug, Error)]
pub enum PluginRunnerError {
    #[error("runner not found for session: {0}")]
    NotFound(SessionId),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("stop failed: {0}")]
    StopFailed(String),
}

/// Everything the runner needs to start a sync run for one reserved
/// session.
#[derive(Debug, Clone)]
pub struct PluginSpawnConfig {
    pub session_id: SessionId,
    pub profile: ProfileName,
    pub client_profile_name: ClientProfileName,
    pub storages: Vec<StorageName>,
    pub direction: SessionDirection,
}

/// Handle to a running plugin runner process.
#[derive(Debug, Clone)]
pub struct PluginHandle {
    pub session_id: SessionId,
    pub pid: Option<u32>,
}

/// Adapter for starting and stopping the plugin runner process behind a
/// sync session. Completion is reported asynchronously on `event_tx` as a
/// `SessionFinished` event, not as this trait's return value — spawn only
/// confirms the process started.
#[async_trait]
pub trait PluginRunner: Clone + Send + Sync + 'static {
    /// Launch the plugin runner for a reserved session.
    async fn spawn(
        &self,
        config: PluginSpawnConfig,
        event_tx: mpsc::Sender<Event>,
    ) -> Result<PluginHandle, PluginRunnerError>;

    /// Ask a running runner to stop. There is no forced kill path in the
    /// daemon's Effect vocabulary (§4.3); a runner that ignores this request
    /// leaves its session RUNNING until it eventually exits on its own.
    async fn stop(&self, session_id: &SessionId) -> Result<(), PluginRunnerError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
