// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: `SYNCD_STATE_DIR` > `XDG_STATE_HOME/syncd` > `~/.local/state/syncd`
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("SYNCD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("syncd"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/syncd"))
}

/// Timer check interval override.
pub fn timer_check_ms() -> Option<Duration> {
    std::env::var("SYNCD_TIMER_CHECK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Alarm check interval override.
pub fn alarm_check_ms() -> Option<Duration> {
    std::env::var("SYNCD_ALARM_CHECK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Plugin runner command override: the binary `ProcessPluginRunner` spawns
/// for each reserved session.
pub fn plugin_runner_command() -> String {
    std::env::var("SYNCD_PLUGIN_RUNNER_COMMAND").unwrap_or_else(|_| "syncd-plugin-runner".to_string())
}

/// Whether scheduled syncs may proceed over a cellular connection.
pub fn allow_scheduled_sync_over_cellular() -> bool {
    std::env::var("SYNCD_ALLOW_CELLULAR_SCHEDULED_SYNC")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Default retry backoff override, applied after a scheduled sync ends in
/// ERROR while another attempt is still permitted.
pub fn retry_backoff_ms() -> Option<Duration> {
    std::env::var("SYNCD_RETRY_BACKOFF_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Maximum consecutive scheduled-sync retries before falling back to the
/// profile's normal schedule.
pub fn max_sync_retries() -> Option<u32> {
    std::env::var("SYNCD_MAX_SYNC_RETRIES").ok().and_then(|s| s.parse::<u32>().ok())
}
