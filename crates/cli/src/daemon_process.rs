// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon process management utilities.
//!
//! Functions for starting, stopping, and probing the `syncd` daemon process.
//! `syncd` has no PID file: a single instance is enforced by an advisory
//! lock on `syncd.lock`, so "is it running" and "has it exited" are answered
//! by probing that lock rather than signalling a remembered PID.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::client::ClientError;

/// Start the daemon in the background, returning the child process handle.
pub fn start_daemon_background() -> Result<std::process::Child, ClientError> {
    let syncd_path = find_syncd_binary()?;

    Command::new(&syncd_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// Stop the daemon synchronously using a graceful IPC shutdown, polling the
/// lock file for release.
///
/// Used during version-mismatch restart where we're in a sync context
/// inside a tokio runtime (can't use block_on for the async client).
pub fn stop_daemon_sync() {
    let Ok(dir) = daemon_dir() else { return };
    let lock_path = dir.join("syncd.lock");

    if !lock_is_held(&lock_path) {
        return;
    }

    // We have no synchronous IPC path here; the caller already attempted a
    // graceful shutdown before reaching this restart branch. Give the old
    // process a moment to release the lock on its own.
    let start = Instant::now();
    let timeout = super::client::timeout_exit();
    while start.elapsed() < timeout {
        if !lock_is_held(&lock_path) {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// Wait for the daemon to release its lock file (i.e. exit).
pub async fn wait_for_exit(timeout: Duration) -> bool {
    let Ok(dir) = daemon_dir() else { return false };
    let lock_path = dir.join("syncd.lock");

    let start = Instant::now();
    while start.elapsed() < timeout {
        if !lock_is_held(&lock_path) {
            return true;
        }
        tokio::time::sleep(super::client::poll_interval()).await;
    }
    false
}

/// True if some process currently holds `syncd.lock` exclusively.
pub fn lock_is_held(lock_path: &Path) -> bool {
    let Ok(file) = std::fs::OpenOptions::new().create(true).write(true).open(lock_path) else {
        return false;
    };
    match file.try_lock_exclusive() {
        Ok(()) => {
            let _ = file.unlock();
            false
        }
        Err(_) => true,
    }
}

/// Find the `syncd` binary.
pub(crate) fn find_syncd_binary() -> Result<PathBuf, ClientError> {
    if let Some(path) = crate::env::daemon_binary() {
        return Ok(PathBuf::from(path));
    }

    let current_exe = std::env::current_exe().ok();

    // Only use CARGO_MANIFEST_DIR if the CLI itself is a debug build, so a
    // release CLI run from a dev checkout doesn't pick up a stale debug
    // daemon.
    let is_debug_build =
        current_exe.as_ref().and_then(|p| p.to_str()).map(|s| s.contains("target/debug")).unwrap_or(false);

    if is_debug_build {
        if let Some(manifest_dir) = crate::env::cargo_manifest_dir() {
            let dev_path =
                PathBuf::from(manifest_dir).parent().and_then(|p| p.parent()).map(|p| p.join("target/debug/syncd"));
            if let Some(path) = dev_path {
                if path.exists() {
                    return Ok(path);
                }
            }
        }
    }

    if let Some(ref exe) = current_exe {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("syncd");
            if sibling.exists() {
                return Ok(sibling);
            }
        }
    }

    Ok(PathBuf::from("syncd"))
}

/// Socket path for the user-level daemon.
pub fn daemon_socket() -> Result<PathBuf, ClientError> {
    Ok(daemon_dir()?.join("syncd.sock"))
}

/// State directory for `syncd`.
pub fn daemon_dir() -> Result<PathBuf, ClientError> {
    crate::env::state_dir()
}

/// Startup marker the daemon writes to its log before anything else.
const STARTUP_MARKER_PREFIX: &str = "--- syncd: starting (pid: ";

/// Read the daemon log from the last startup marker, looking for errors.
pub fn read_startup_error() -> Option<String> {
    let dir = daemon_dir().ok()?;
    let log_path = dir.join("syncd.log");

    let content = std::fs::read_to_string(&log_path).ok()?;
    parse_startup_error(&content)
}

/// Parse startup errors from log content (pure logic, no I/O).
fn parse_startup_error(content: &str) -> Option<String> {
    let start_pos = content.rfind(STARTUP_MARKER_PREFIX)?;
    let startup_log = &content[start_pos..];

    let errors: Vec<&str> = startup_log.lines().filter(|line| line.contains("ERROR")).collect();

    if errors.is_empty() {
        return None;
    }

    Some(errors.join("\n"))
}

/// Wrap an error with startup log info if available.
pub fn wrap_with_startup_error(err: ClientError) -> ClientError {
    if matches!(err, ClientError::DaemonStartFailed(_)) {
        return err;
    }

    match read_startup_error() {
        Some(startup_error) => ClientError::DaemonStartFailed(startup_error),
        None => err,
    }
}

/// Probe whether a Unix socket is accepting connections.
pub fn probe_socket(socket_path: &Path) -> bool {
    std::os::unix::net::UnixStream::connect(socket_path).is_ok()
}

/// Remove a stale socket file left behind by a daemon that is no longer
/// holding its lock.
pub fn cleanup_stale_socket() -> Result<(), ClientError> {
    let dir = daemon_dir()?;
    let socket_path = dir.join("syncd.sock");
    let lock_path = dir.join("syncd.lock");

    if socket_path.exists() && !lock_is_held(&lock_path) {
        let _ = std::fs::remove_file(&socket_path);
    }

    Ok(())
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
