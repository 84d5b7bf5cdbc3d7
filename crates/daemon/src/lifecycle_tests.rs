use super::*;

fn config_in(dir: &std::path::Path) -> Config {
    Config {
        state_dir: dir.to_path_buf(),
        socket_path: dir.join("syncd.sock"),
        lock_path: dir.join("syncd.lock"),
        version_path: dir.join("syncd.version"),
        log_path: dir.join("syncd.log"),
        wal_path: dir.join("wal.log"),
        snapshot_path: dir.join("snapshot.json.zst"),
        alarm_db_path: dir.join("alarms.sqlite3"),
        retry_policy: RetryPolicy::default(),
    }
}

#[tokio::test]
async fn startup_succeeds_on_a_fresh_state_dir() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = DaemonState::startup(config_in(dir.path())).await.unwrap();

    assert_eq!(daemon.state.lock().profiles.len(), 0);
    assert!(dir.path().join("syncd.lock").exists());
    assert!(dir.path().join("syncd.version").exists());
}

#[tokio::test]
async fn startup_twice_on_the_same_dir_fails_to_acquire_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = DaemonState::startup(config_in(dir.path())).await.unwrap();

    let err = DaemonState::startup(config_in(dir.path())).await.unwrap_err();
    assert!(matches!(err, LifecycleError::AlreadyRunning(_)));

    drop(daemon);
}

#[test]
fn reconcile_marks_non_terminal_sessions_failed_and_frees_their_storages() {
    use syncd_core::{ClientProfileName, Profile, SessionDirection, SessionId, StorageName, SyncSession};

    let mut state = MaterializedState::default();
    let profile = Profile::new("contacts-google", "google-contacts");
    let mut session = SyncSession::new(SessionId::new("s1"), profile, SessionDirection::Outbound, true);
    session.state = SessionState::Running;
    session.reserved_storages = std::iter::once(StorageName::new("contacts")).collect();
    state.sessions.insert("s1".to_string(), session);
    state.reserved_storages.insert("contacts".to_string(), ClientProfileName::new("google-contacts").as_str().to_string());

    reconcile_orphaned_sessions(&mut state);

    assert_eq!(state.sessions["s1"].state, SessionState::Error);
    assert!(state.reserved_storages.is_empty());
}
