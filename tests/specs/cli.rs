//! `syncdctl` behavior when no daemon is reachable, and basic argument
//! validation that doesn't require a running daemon.

use crate::prelude::Harness;

#[test]
fn ping_fails_when_no_daemon_is_up() {
    let harness = Harness::new();
    harness.ctl().args(&["ping"]).fails().stderr_has("not running");
}

#[test]
fn daemon_status_reports_not_running_when_no_daemon_is_up() {
    let harness = Harness::new();
    harness.ctl().args(&["daemon", "status"]).passes().stdout_has("not running");
}

#[test]
fn status_json_reports_not_running_when_no_daemon_is_up() {
    let harness = Harness::new();
    harness.ctl().args(&["-o", "json", "status"]).passes().stdout_has("not_running");
}

#[test]
fn daemon_logs_on_a_fresh_state_dir_prints_nothing_and_does_not_error() {
    let harness = Harness::new();
    harness.ctl().args(&["daemon", "logs"]).passes();
}
