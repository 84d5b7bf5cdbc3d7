//! `syncdctl sync` operations against a live daemon.
//!
//! Profile definitions themselves (the XML profile store) are out of
//! scope for this daemon, so these specs exercise the parts of the
//! surface that don't require a pre-provisioned profile: connectivity,
//! profile-change notification, and backup coordination, plus the
//! rejection path for operations that do need a known profile. The
//! storage-contention and alarm-coalescing scenarios that do need real
//! profiles are covered by `syncd-engine`'s own test suite with fake
//! adapters and a `FakeClock`.

use crate::prelude::Harness;

#[test]
fn starting_an_unconfigured_profile_is_rejected() {
    let mut harness = Harness::new();
    harness.spawn_daemon();

    harness
        .ctl()
        .args(&["sync", "start", "contacts-google"])
        .fails()
        .stderr_has("unknown profile: contacts-google");
}

#[test]
fn aborting_a_profile_with_no_active_session_is_rejected() {
    let mut harness = Harness::new();
    harness.spawn_daemon();

    // `abort` looks for a non-terminal session for the profile; with none
    // running (or even configured) it reports the session lookup failure,
    // not a profile-lookup failure.
    harness.ctl().args(&["sync", "abort", "contacts-google"]).fails().stderr_has("unknown session");
}

#[test]
fn refresh_external_sync_on_an_unconfigured_profile_is_rejected() {
    let mut harness = Harness::new();
    harness.spawn_daemon();

    harness
        .ctl()
        .args(&["sync", "refresh-external-sync", "contacts-google", "--force"])
        .fails()
        .stderr_has("unknown profile");
}

#[test]
fn profile_added_notification_is_accepted_without_a_preexisting_profile() {
    let mut harness = Harness::new();
    harness.spawn_daemon();

    harness.ctl().args(&["sync", "profile-changed", "contacts-google", "added"]).passes();
}

#[test]
fn profile_removed_notification_is_accepted_even_if_never_added() {
    let mut harness = Harness::new();
    harness.spawn_daemon();

    harness.ctl().args(&["sync", "profile-changed", "contacts-google", "removed"]).passes();
}

#[test]
fn connectivity_changed_round_trip() {
    let mut harness = Harness::new();
    harness.spawn_daemon();

    harness.ctl().args(&["sync", "connectivity-changed", "--online", "--internet-type", "wifi"]).passes();
    harness.ctl().args(&["sync", "connectivity-changed"]).passes();
}

#[test]
fn backup_start_then_finish_is_accepted_with_no_active_sessions() {
    let mut harness = Harness::new();
    harness.spawn_daemon();

    harness.ctl().args(&["sync", "backup-start", "backup-start"]).passes();
    harness.ctl().args(&["sync", "backup-finish", "backup-done"]).passes();
}

#[test]
fn session_finished_with_an_unknown_session_id_is_rejected() {
    let mut harness = Harness::new();
    harness.spawn_daemon();

    harness
        .ctl()
        .args(&["sync", "session-finished", "not-a-real-session", "done"])
        .fails()
        .stderr_has("unknown session");
}
