// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `syncd`: sync orchestration daemon entry point.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

use syncd_core::Event;
use syncd_daemon::lifecycle::{Config, DaemonState, LifecycleError};
use syncd_daemon::listener::{ListenCtx, Listener};

const DEFAULT_TIMER_CHECK: Duration = Duration::from_millis(500);
const DEFAULT_ALARM_CHECK: Duration = Duration::from_secs(30);
const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(60);
const FLUSH_INTERVAL: Duration = Duration::from_millis(10);

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let arg = std::env::args().nth(1);
    match arg.as_deref() {
        Some("--version") => {
            println!("syncd {}", env!("CARGO_PKG_VERSION"));
            return std::process::ExitCode::SUCCESS;
        }
        Some("--help") => {
            println!("syncd — sync orchestration daemon\n\nUsage: syncd [--version|--help]");
            return std::process::ExitCode::SUCCESS;
        }
        _ => {}
    }

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("syncd: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    setup_logging(&config.log_path);

    match run(config).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            if let LifecycleError::AlreadyRunning(path) = &e {
                eprintln!("syncd: already running (lock held at {})", path.display());
            } else {
                tracing::error!(error = %e, "startup failed");
            }
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), LifecycleError> {
    let socket_path = config.socket_path.clone();
    tracing::info!("--- syncd: starting (pid: {}) ---", std::process::id());
    let mut daemon = DaemonState::startup(config).await?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "syncd started");

    let shutdown = Arc::new(Notify::new());
    let ctx = ListenCtx {
        synchronizer: Arc::clone(&daemon.synchronizer),
        state: Arc::clone(&daemon.state),
        start_time: Instant::now(),
        shutdown: Arc::clone(&shutdown),
    };
    let listener = Listener::new(ctx, socket_path);
    let listener_task = tokio::spawn(async move {
        if let Err(e) = listener.run().await {
            tracing::error!(error = %e, "listener exited");
        }
    });

    let wal = daemon.event_reader.wal();
    let snapshot_path = daemon.config.snapshot_path.clone();
    let checkpoint_task = tokio::spawn(spawn_checkpoint(wal.clone(), daemon.state.clone(), snapshot_path));
    let flush_task = tokio::spawn(spawn_flush_task(daemon.event_bus.clone()));

    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("installing SIGTERM handler");
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .expect("installing SIGINT handler");

    let timer_check = syncd_daemon::env::timer_check_ms().unwrap_or(DEFAULT_TIMER_CHECK);
    let alarm_check = syncd_daemon::env::alarm_check_ms().unwrap_or(DEFAULT_ALARM_CHECK);
    let mut timer_tick = tokio::time::interval(timer_check);
    let mut alarm_tick = tokio::time::interval(alarm_check);

    loop {
        tokio::select! {
            entry = daemon.event_reader.recv() => {
                match entry {
                    Ok(Some(entry)) => daemon.event_reader.mark_processed(entry.seq),
                    Ok(None) => break,
                    Err(e) => tracing::warn!(error = %e, "wal read error"),
                }
            }
            _ = timer_tick.tick() => {
                let fired = daemon.synchronizer.scheduler().lock().fired_timers(std::time::Instant::now());
                for event in fired {
                    if let Event::TimerFired { id } = event {
                        if let Err(e) = daemon.synchronizer.on_timer_fired(&id).await {
                            tracing::warn!(error = %e, timer = ?id, "timer dispatch failed");
                        }
                    }
                }
            }
            _ = alarm_tick.tick() => {
                match daemon.synchronizer.alarms().fired_alarms(std::time::SystemTime::now()) {
                    Ok(fired) => {
                        for event in fired {
                            if let Event::AlarmFired { profile, .. } = event {
                                if let Err(e) = daemon.synchronizer.on_alarm_fired(profile.as_str()).await {
                                    tracing::warn!(error = %e, profile = %profile.as_str(), "alarm dispatch failed");
                                }
                            }
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "alarm store read failed"),
                }
            }
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                tracing::info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    shutdown.notify_waiters();
    listener_task.abort();
    checkpoint_task.abort();
    flush_task.abort();
    daemon.shutdown();
    Ok(())
}

async fn spawn_checkpoint(
    wal: Arc<parking_lot::Mutex<syncd_storage::Wal>>,
    state: Arc<parking_lot::Mutex<syncd_storage::MaterializedState>>,
    snapshot_path: std::path::PathBuf,
) {
    let checkpointer = syncd_storage::Checkpointer::new(snapshot_path);
    let mut tick = tokio::time::interval(CHECKPOINT_INTERVAL);
    loop {
        tick.tick().await;
        let seq = wal.lock().write_seq();
        let snapshot_state = state.lock().clone();
        let handle = checkpointer.start(seq, &snapshot_state);
        match handle.wait() {
            Ok(result) => {
                tracing::debug!(seq = result.seq, bytes = result.size_bytes, "checkpoint complete");
                if let Err(e) = wal.lock().truncate_before(seq) {
                    tracing::warn!(error = %e, "wal truncation failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "checkpoint failed"),
        }
    }
}

async fn spawn_flush_task(event_bus: syncd_daemon::event_bus::EventBus) {
    let mut tick = tokio::time::interval(FLUSH_INTERVAL);
    loop {
        tick.tick().await;
        if event_bus.needs_flush() {
            if let Err(e) = event_bus.flush() {
                tracing::warn!(error = %e, "periodic wal flush failed");
            }
        }
    }
}

fn setup_logging(log_path: &std::path::Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let dir = log_path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let file_name = log_path.file_name().and_then(|n| n.to_str()).unwrap_or("syncd.log");
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    // Leaked intentionally: the guard must outlive the process for buffered
    // writes to flush, and main() never returns early after this point.
    std::mem::forget(guard);

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
}
