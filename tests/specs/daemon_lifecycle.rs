//! Daemon process lifecycle: start, ping, status, stop, restart — driven
//! entirely through `syncdctl`, exercising the advisory-lock-based
//! liveness probe (`syncd` has no PID file).

use crate::prelude::Harness;

#[test]
fn daemon_start_ping_status_stop_round_trip() {
    let harness = Harness::new();

    harness.ctl().args(&["daemon", "start"]).passes().stdout_has("daemon started");

    harness.ctl().args(&["ping"]).passes().stdout_has("pong");

    let status = harness.ctl().args(&["daemon", "status"]).passes();
    let out = status.stdout();
    assert!(out.lines().any(|l| l.starts_with("profiles:") && l.trim_end().ends_with('0')));
    assert!(out.lines().any(|l| l.starts_with("active sessions:") && l.trim_end().ends_with('0')));

    harness.ctl().args(&["daemon", "stop"]).passes().stdout_has("daemon stopped");

    harness.ctl().args(&["ping"]).fails();
}

#[test]
fn starting_an_already_running_daemon_is_a_no_op() {
    let harness = Harness::new();
    harness.ctl().args(&["daemon", "start"]).passes();
    harness.ctl().args(&["daemon", "start"]).passes().stdout_has("already running");
}

#[test]
fn stopping_when_nothing_is_running_is_reported_not_an_error() {
    let harness = Harness::new();
    harness.ctl().args(&["daemon", "stop"]).passes().stdout_has("not running");
}

#[test]
fn restart_brings_up_a_fresh_daemon_reachable_by_ping() {
    let harness = Harness::new();
    harness.ctl().args(&["daemon", "start"]).passes();
    harness.ctl().args(&["daemon", "restart"]).passes().stdout_has("daemon restarted");
    harness.ctl().args(&["ping"]).passes().stdout_has("pong");
}

#[test]
fn auto_start_from_a_sync_command_brings_the_daemon_up_on_demand() {
    let harness = Harness::new();

    // No explicit `daemon start` - the `sync` command path auto-starts via
    // `DaemonClient::for_action`.
    harness.ctl().args(&["sync", "profile-changed", "contacts-google", "added"]).passes();

    harness.ctl().args(&["ping"]).passes().stdout_has("pong");
}

#[test]
fn daemon_status_reflects_an_active_connectivity_change() {
    let mut harness = Harness::new();
    harness.spawn_daemon();

    harness.ctl().args(&["sync", "connectivity-changed", "--online", "--internet-type", "wifi"]).passes();

    let status = harness.ctl().args(&["daemon", "status"]).passes();
    let out = status.stdout();
    assert!(out.lines().any(|l| l.starts_with("waiting for online:") && l.trim_end().ends_with('0')));
}
