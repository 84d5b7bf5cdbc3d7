// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle and diagnostic logging for the CLI client.

use std::path::PathBuf;

use crate::client::{timeout_exit, ClientError, DaemonClient};
use crate::daemon_process::{cleanup_stale_socket, daemon_dir, daemon_socket, lock_is_held, wait_for_exit};

/// Stop the daemon gracefully via IPC, waiting for it to release its lock.
/// Returns true if a daemon was stopped, false if none was running.
pub async fn daemon_stop() -> Result<bool, ClientError> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(ClientError::DaemonNotRunning) => {
            let _ = cleanup_stale_socket();
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    client.shutdown().await?;
    wait_for_exit(timeout_exit()).await;
    let _ = cleanup_stale_socket();

    Ok(true)
}

/// Write a diagnostic message to `~/.local/state/syncd/cli.log`.
fn write_cli_log(message: String) {
    use std::io::Write;
    use std::time::SystemTime;

    let log_path = daemon_dir()
        .unwrap_or_else(|_| {
            std::env::var("HOME")
                .map(|h| PathBuf::from(h).join(".local/state/syncd"))
                .unwrap_or_else(|_| PathBuf::from("/tmp"))
        })
        .join("cli.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    if let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(&log_path) {
        let timestamp = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
        let pid = std::process::id();
        let cwd = std::env::current_dir().map(|p| p.display().to_string()).unwrap_or_else(|_| "(unknown)".to_string());
        let state_dir = std::env::var("SYNCD_STATE_DIR").unwrap_or_else(|_| "(not set)".to_string());

        let _ = writeln!(file, "[ts={}] pid={} cwd={} SYNCD_STATE_DIR={} {}", timestamp, pid, cwd, state_dir, message);
    }
}

/// Log a connection error for debugging.
///
/// Writes diagnostic info to `~/.local/state/syncd/cli.log` when the CLI
/// fails to connect to the daemon, since a command run from a script or
/// another process may not have its stderr visible anywhere else.
pub fn log_connection_error(error: &ClientError) {
    let socket_path = daemon_socket().map(|p| p.display().to_string()).unwrap_or_else(|_| "(unknown)".to_string());
    write_cli_log(format!("socket={} error={}", socket_path, error));
}

/// Re-exported for `daemon_process`'s lock probe, kept here so callers of
/// this module don't need to reach into `daemon_process` directly.
pub fn daemon_running() -> bool {
    match daemon_dir() {
        Ok(dir) => lock_is_held(&dir.join("syncd.lock")),
        Err(_) => false,
    }
}
