use super::*;
use serial_test::serial;

#[test]
#[serial]
fn status_colors_known_states_and_leaves_unknown_plain() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");

    assert!(status("running").starts_with("\x1b[32m"));
    assert!(status("waiting (peer-offline)").starts_with("\x1b[33m"));
    assert!(status("failed: timeout").starts_with("\x1b[31m"));
    assert_eq!(status("mystery"), "mystery");

    std::env::remove_var("COLOR");
}

#[test]
#[serial]
fn no_color_env_var_always_wins() {
    std::env::set_var("COLOR", "1");
    std::env::set_var("NO_COLOR", "1");

    assert_eq!(status("running"), "running");

    std::env::remove_var("COLOR");
    std::env::remove_var("NO_COLOR");
}

#[test]
fn help_printer_uncolored_emits_no_escape_codes() {
    let mut p = HelpPrinter::uncolored();
    p.header("Commands:");
    p.entry("start", 10, Some("start a sync"));
    let out = p.finish();
    assert!(!out.contains('\x1b'));
    assert!(out.contains("start"));
    assert!(out.contains("start a sync"));
}
