// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup, recovery, and shutdown.
//!
//! Startup order matters: the lock file guards against a second instance,
//! directories must exist before anything tries to open a file inside
//! them, and WAL replay must land in `MaterializedState` before any
//! adapter touches it. Session reconciliation runs last, since it depends
//! on the fully-replayed state.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

use syncd_adapters::{
    DesktopNotifyAdapter, ProcessPluginRunner, StaticConnectivityTracker, StaticPowerPolicy,
};
use syncd_core::{Clock, Event, InternetType, SessionState, SystemClock, UuidIdGen};
use syncd_engine::{AlarmInventory, BackupCoordinator, Executor, RetryPolicy, Scheduler, Synchronizer};
use syncd_storage::{load_snapshot, AlarmStore, MaterializedState, Wal};

use crate::env;
use crate::event_bus::{EventBus, EventReader};

pub type DaemonSynchronizer = Synchronizer<
    ProcessPluginRunner,
    DesktopNotifyAdapter,
    SystemClock,
    StaticConnectivityTracker,
    StaticPowerPolicy,
    UuidIdGen,
>;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not resolve a state directory (set SYNCD_STATE_DIR or HOME)")]
    NoStateDir,
    #[error("daemon already running (lock held at {0})")]
    AlreadyRunning(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] syncd_storage::SnapshotError),
    #[error("wal error: {0}")]
    Wal(#[from] syncd_storage::WalError),
    #[error("alarm store error: {0}")]
    AlarmStore(#[from] syncd_storage::AlarmStoreError),
    #[error("engine error: {0}")]
    Engine(#[from] syncd_engine::EngineError),
}

/// Filesystem layout for one daemon instance, resolved once at startup.
#[derive(Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub version_path: PathBuf,
    pub log_path: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub alarm_db_path: PathBuf,
    pub retry_policy: RetryPolicy,
}

impl Config {
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;
        let default_policy = RetryPolicy::default();
        let retry_policy = RetryPolicy {
            backoff: env::retry_backoff_ms().unwrap_or(default_policy.backoff),
            max_retries: env::max_sync_retries().unwrap_or(default_policy.max_retries),
        };
        Ok(Self {
            socket_path: state_dir.join("syncd.sock"),
            lock_path: state_dir.join("syncd.lock"),
            version_path: state_dir.join("syncd.version"),
            log_path: state_dir.join("syncd.log"),
            wal_path: state_dir.join("wal.log"),
            snapshot_path: state_dir.join("snapshot.json.zst"),
            alarm_db_path: state_dir.join("alarms.sqlite3"),
            retry_policy,
            state_dir,
        })
    }
}

/// Everything the daemon's main loop needs once startup completes.
pub struct DaemonState {
    pub config: Config,
    pub synchronizer: Arc<DaemonSynchronizer>,
    pub state: Arc<Mutex<MaterializedState>>,
    pub event_bus: EventBus,
    pub event_reader: EventReader,
    _lock_file: File,
}

impl DaemonState {
    /// Acquire the advisory lock, replay durable state, and wire up the
    /// orchestrator. Leaves the lock file held for the process lifetime.
    pub async fn startup(config: Config) -> Result<Self, LifecycleError> {
        match Self::startup_inner(&config).await {
            Ok(state) => Ok(state),
            Err(e) => {
                cleanup_on_failure(&config);
                Err(e)
            }
        }
    }

    async fn startup_inner(config: &Config) -> Result<Self, LifecycleError> {
        std::fs::create_dir_all(&config.state_dir)?;

        let lock_file = acquire_lock(&config.lock_path)?;
        std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

        let snapshot = load_snapshot(&config.snapshot_path)?;
        let (base_state, snapshot_seq) = match snapshot {
            Some(snap) => (snap.state, snap.seq),
            None => (MaterializedState::default(), 0),
        };

        let mut wal = Wal::open(&config.wal_path, snapshot_seq)?;
        let mut state = base_state;
        for entry in wal.entries_after(snapshot_seq)? {
            state.apply_event(&entry.event);
        }
        reconcile_orphaned_sessions(&mut state);

        let state = Arc::new(Mutex::new(state));
        let (event_bus, event_reader) = EventBus::new(wal);

        let alarm_store = AlarmStore::open(&config.alarm_db_path)?;
        let alarms = Arc::new(AlarmInventory::new(alarm_store));
        let scheduler = Arc::new(Mutex::new(Scheduler::new()));
        let backup = Arc::new(BackupCoordinator::new());
        let clock = SystemClock;

        let (event_tx, _event_rx) = mpsc::channel(256);
        let plugins = ProcessPluginRunner::new(env::plugin_runner_command());
        let notifier = DesktopNotifyAdapter::new();

        let executor = Executor::new(
            plugins,
            notifier,
            Arc::clone(&state),
            alarms,
            scheduler,
            backup,
            clock,
            event_tx,
        );

        let connectivity = StaticConnectivityTracker::always_online(InternetType::Wifi);
        let power = StaticPowerPolicy::normal();
        let id_gen = UuidIdGen;

        let (wal_tx, mut wal_rx) = mpsc::channel::<Event>(256);
        let forward_bus = event_bus.clone();
        tokio::spawn(async move {
            while let Some(event) = wal_rx.recv().await {
                if let Err(e) = forward_bus.send(event) {
                    tracing::error!(error = %e, "failed to append event to wal");
                }
            }
        });

        let synchronizer = Arc::new(Synchronizer::new(
            executor,
            connectivity,
            power,
            id_gen,
            env::allow_scheduled_sync_over_cellular(),
            config.retry_policy,
            wal_tx,
        ));

        Ok(Self {
            config: config.clone(),
            synchronizer,
            state,
            event_bus,
            event_reader,
            _lock_file: lock_file,
        })
    }

    /// Flush the WAL and remove the socket so a restart doesn't see a
    /// stale listener.
    pub fn shutdown(&self) {
        if let Err(e) = self.event_bus.flush() {
            tracing::warn!(error = %e, "final wal flush failed");
        }
        let _ = std::fs::remove_file(&self.config.socket_path);
    }
}

/// Any session still `Reserved`/`Starting`/`Running` after a replay was
/// orphaned by the crash: no process handle survives a restart, so force it
/// into `Error` rather than let it sit unreachable forever.
fn reconcile_orphaned_sessions(state: &mut MaterializedState) {
    let orphaned: Vec<String> = state
        .sessions
        .values()
        .filter(|s| matches!(s.state, SessionState::Reserved | SessionState::Starting | SessionState::Running))
        .map(|s| s.id.as_str().to_string())
        .collect();

    for id in orphaned {
        tracing::warn!(session_id = %id, "orphaned session found on startup, marking failed");
        let Some(session) = state.sessions.get_mut(&id) else { continue };
        session.state = SessionState::Error;
        let storages: Vec<String> = session.reserved_storages.iter().map(|s| s.as_str().to_string()).collect();
        for storage in storages {
            state.reserved_storages.remove(&storage);
        }
    }
}

fn acquire_lock(path: &Path) -> Result<File, LifecycleError> {
    use fs2::FileExt;

    let file = std::fs::OpenOptions::new().create(true).write(true).open(path)?;
    file.try_lock_exclusive().map_err(|_| LifecycleError::AlreadyRunning(path.to_path_buf()))?;
    Ok(file)
}

fn cleanup_on_failure(config: &Config) {
    let _ = std::fs::remove_file(&config.socket_path);
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
