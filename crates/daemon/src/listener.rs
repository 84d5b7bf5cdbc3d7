// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix socket listener: accepts IPC connections and dispatches each
//! request to the `Synchronizer`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;

use syncd_storage::MaterializedState;

use crate::lifecycle::DaemonSynchronizer;
use crate::protocol::{self, DaemonStatus, Request, Response, DEFAULT_TIMEOUT};

/// Shared context handed to every accepted connection.
#[derive(Clone)]
pub struct ListenCtx {
    pub synchronizer: Arc<DaemonSynchronizer>,
    pub state: Arc<Mutex<MaterializedState>>,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

pub struct Listener {
    ctx: ListenCtx,
    socket_path: PathBuf,
}

impl Listener {
    pub fn new(ctx: ListenCtx, socket_path: impl Into<PathBuf>) -> Self {
        Self { ctx, socket_path: socket_path.into() }
    }

    /// Bind the socket and accept connections until `ctx.shutdown` fires.
    pub async fn run(&self) -> std::io::Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }
        let listener = UnixListener::bind(&self.socket_path)?;
        tracing::info!(path = %self.socket_path.display(), "listening");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, _addr) = accepted?;
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(ctx, stream).await {
                            tracing::debug!(error = %e, "connection ended");
                        }
                    });
                }
                _ = self.ctx.shutdown.notified() => {
                    return Ok(());
                }
            }
        }
    }
}

async fn handle_connection(ctx: ListenCtx, mut stream: UnixStream) -> Result<(), protocol::ProtocolError> {
    loop {
        let request = match protocol::read_request(&mut stream, DEFAULT_TIMEOUT).await {
            Ok(req) => req,
            Err(protocol::ProtocolError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e),
        };

        let is_shutdown = matches!(request, Request::Shutdown);
        let response = handle_request(&ctx, request).await;
        protocol::write_response(&mut stream, &response, DEFAULT_TIMEOUT).await?;

        if is_shutdown {
            ctx.shutdown.notify_waiters();
            return Ok(());
        }
    }
}

async fn handle_request(ctx: &ListenCtx, request: Request) -> Response {
    let result = dispatch(ctx, request).await;
    match result {
        Ok(response) => response,
        Err(e) => Response::Error { message: e.to_string() },
    }
}

async fn dispatch(ctx: &ListenCtx, request: Request) -> Result<Response, syncd_engine::EngineError> {
    match request {
        Request::Ping => Ok(Response::Pong),
        Request::Hello { .. } => Ok(Response::Hello { version: protocol::PROTOCOL_VERSION.to_string() }),
        Request::Shutdown => Ok(Response::ShuttingDown),

        Request::Status => Ok(Response::Status(status(ctx))),

        Request::Start { profile } => {
            ctx.synchronizer.start(&profile).await?;
            Ok(Response::Ok)
        }
        Request::StartScheduled { profile } => {
            ctx.synchronizer.start_scheduled(&profile).await?;
            Ok(Response::Ok)
        }
        Request::Abort { profile } => {
            ctx.synchronizer.abort(&profile).await?;
            Ok(Response::Ok)
        }

        Request::SessionFinished { session_id, status, message, minor_code } => {
            ctx.synchronizer.on_session_finished(&session_id, status, message, minor_code).await?;
            Ok(Response::Ok)
        }

        Request::ProfileChanged { profile, kind } => {
            ctx.synchronizer.on_profile_changed(&profile, kind).await?;
            Ok(Response::Ok)
        }

        Request::ConnectivityChanged { online, internet_type } => {
            ctx.synchronizer.on_connectivity_changed(online, internet_type).await?;
            Ok(Response::Ok)
        }

        Request::BackupStart { kind } => {
            // Register for the delayed reply before triggering the drain,
            // so the resolve can't race ahead of this registration.
            let reply = ctx.synchronizer.backup().register(kind);
            ctx.synchronizer.backup_start(kind).await?;
            let _ = reply.await;
            Ok(Response::Ok)
        }
        Request::BackupFinish { kind } => {
            let reply = ctx.synchronizer.backup().register(kind);
            ctx.synchronizer.backup_finish(kind).await?;
            let _ = reply.await;
            Ok(Response::Ok)
        }

        Request::RefreshExternalSync { profile, force } => {
            ctx.synchronizer.refresh_external_sync(&profile, force).await?;
            Ok(Response::Ok)
        }
    }
}

fn status(ctx: &ListenCtx) -> DaemonStatus {
    let state = ctx.state.lock();
    DaemonStatus {
        version: protocol::PROTOCOL_VERSION.to_string(),
        uptime_secs: ctx.start_time.elapsed().as_secs(),
        profile_count: state.profiles.len(),
        active_sessions: state.active_sessions().count(),
        queued_sessions: state.session_queue.len(),
        backup_active: state.backup_active,
        waiting_for_online: state.waiting_for_online.len(),
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
