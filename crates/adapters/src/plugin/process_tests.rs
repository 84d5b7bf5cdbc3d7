// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use syncd_core::{ClientProfileName, ProfileName, SessionDirection};
use tokio::sync::mpsc;

use super::*;

fn config(session_id: &str) -> PluginSpawnConfig {
    PluginSpawnConfig {
        session_id: SessionId::new(session_id),
        profile: ProfileName::new("calendar"),
        client_profile_name: ClientProfileName::new("hcalendar"),
        storages: vec![],
        direction: SessionDirection::Outbound,
    }
}

#[tokio::test]
async fn successful_exit_reports_done() {
    let runner = ProcessPluginRunner::new("true");
    let (tx, mut rx) = mpsc::channel(4);
    runner.spawn(config("s1"), tx).await.unwrap();

    let event = rx.recv().await.unwrap();
    match event {
        Event::SessionFinished { status, .. } => assert_eq!(status, SyncStatus::Done),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn failing_exit_reports_error() {
    let runner = ProcessPluginRunner::new("false");
    let (tx, mut rx) = mpsc::channel(4);
    runner.spawn(config("s1"), tx).await.unwrap();

    let event = rx.recv().await.unwrap();
    match event {
        Event::SessionFinished { status, .. } => assert_eq!(status, SyncStatus::Error),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn stop_before_exit_reports_cancelled() {
    // `yes` repeats its argument forever regardless of what it is, so it
    // stays alive long enough for `stop()` to race it deterministically.
    let runner = ProcessPluginRunner::new("yes");
    let (tx, mut rx) = mpsc::channel(4);
    let handle = runner.spawn(config("s1"), tx).await.unwrap();
    assert_eq!(handle.session_id, SessionId::new("s1"));

    runner.stop(&SessionId::new("s1")).await.unwrap();

    let event = rx.recv().await.unwrap();
    match event {
        Event::SessionFinished { status, .. } => {
            assert!(matches!(status, SyncStatus::Cancelled | SyncStatus::Error))
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn stop_on_unknown_session_errors() {
    let runner = ProcessPluginRunner::new("true");
    let result = runner.stop(&SessionId::new("missing")).await;
    assert!(matches!(result, Err(PluginRunnerError::NotFound(_))));
}
