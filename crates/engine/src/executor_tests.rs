// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use syncd_adapters::{FakeNotifyAdapter, FakePluginRunner};
use syncd_core::{
    BackupReplyKind, ClientProfileName, Event, FakeClock, ProfileName, SessionDirection, SessionId,
    StorageName, TimerId,
};
use syncd_storage::AlarmStore;
use tokio::sync::mpsc;

use super::*;

fn executor() -> (Executor<FakePluginRunner, FakeNotifyAdapter, FakeClock>, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(16);
    let executor = Executor::new(
        FakePluginRunner::new(),
        FakeNotifyAdapter::new(),
        Arc::new(Mutex::new(MaterializedState::default())),
        Arc::new(AlarmInventory::new(AlarmStore::open_in_memory().unwrap())),
        Arc::new(Mutex::new(Scheduler::new())),
        Arc::new(BackupCoordinator::new()),
        FakeClock::new(),
        tx,
    );
    (executor, rx)
}

#[tokio::test]
async fn emit_applies_to_state_and_returns_event() {
    let (executor, _rx) = executor();
    let event = Event::ProfileChanged {
        profile: ProfileName::new("calendar"),
        kind: syncd_core::ProfileChangeKind::Added,
    };

    let result = executor.execute(Effect::Emit { event: event.clone() }).await.unwrap();
    assert_eq!(result, Some(event));
    assert!(executor.state().lock().get_profile("calendar").is_some());
}

#[tokio::test]
async fn spawn_plugin_runner_forwards_to_adapter() {
    let (executor, _rx) = executor();
    let effect = Effect::SpawnPluginRunner {
        session_id: SessionId::new("s1"),
        profile: ProfileName::new("calendar"),
        client_profile_name: ClientProfileName::new("hcalendar"),
        storages: vec![StorageName::new("hcalendar")],
        direction: SessionDirection::Outbound,
    };
    executor.execute(effect).await.unwrap();
    // no plugin handle to inspect here directly; verified via fake's call log
}

#[tokio::test]
async fn set_timer_then_cancel_leaves_scheduler_empty() {
    let (executor, _rx) = executor();
    let id = TimerId::sync_on_change("calendar");
    executor
        .execute(Effect::SetTimer { id: id.clone(), duration: Duration::from_secs(30) })
        .await
        .unwrap();
    assert!(executor.scheduler().lock().has_timers());

    executor.execute(Effect::CancelTimer { id }).await.unwrap();
    assert!(!executor.scheduler().lock().has_timers());
}

#[tokio::test]
async fn persist_and_delete_alarm_round_trip() {
    let (executor, _rx) = executor();
    let profile = ProfileName::new("calendar");
    let fire_at = executor.clock().now_utc() + Duration::from_secs(60);

    executor.execute(Effect::PersistAlarm { profile: profile.clone(), fire_at }).await.unwrap();
    executor.execute(Effect::DeleteAlarm { profile }).await.unwrap();
}

#[tokio::test]
async fn resolve_backup_reply_wakes_registered_waiter() {
    let (executor, _rx) = executor();
    let rx = executor.backup.register(BackupReplyKind::BackupStart);
    executor.execute(Effect::ResolveBackupReply { kind: BackupReplyKind::BackupStart }).await.unwrap();
    rx.await.unwrap();
}

#[tokio::test]
async fn notify_failure_is_swallowed() {
    let (executor, _rx) = executor();
    let result = executor
        .execute(Effect::Notify { title: "t".into(), message: "m".into() })
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn stop_plugin_runner_on_unknown_session_errors() {
    let (executor, _rx) = executor();
    let result = executor.execute(Effect::StopPluginRunner { session_id: SessionId::new("missing") }).await;
    assert!(result.is_err());
}
