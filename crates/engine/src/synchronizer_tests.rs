// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use syncd_adapters::{FakeConnectivityTracker, FakeNotifyAdapter, FakePluginRunner, FakePowerPolicy};
use syncd_core::{FakeClock, Profile, ProfileChangeKind, SequentialIdGen, SyncType};
use syncd_storage::{AlarmStore, MaterializedState};
use tokio::sync::mpsc;

use super::*;

type TestSynchronizer = Synchronizer<
    FakePluginRunner,
    FakeNotifyAdapter,
    FakeClock,
    FakeConnectivityTracker,
    FakePowerPolicy,
    SequentialIdGen,
>;

fn synchronizer(
    online: bool,
) -> (TestSynchronizer, Arc<Mutex<MaterializedState>>, FakePowerPolicy, mpsc::Receiver<Event>) {
    synchronizer_with_retry_policy(online, crate::sync_scheduler::RetryPolicy::default())
}

fn synchronizer_with_retry_policy(
    online: bool,
    retry_policy: crate::sync_scheduler::RetryPolicy,
) -> (TestSynchronizer, Arc<Mutex<MaterializedState>>, FakePowerPolicy, mpsc::Receiver<Event>) {
    let state = Arc::new(Mutex::new(MaterializedState::default()));
    let (tx, rx) = mpsc::channel(64);
    let power = FakePowerPolicy::new();
    let executor = Executor::new(
        FakePluginRunner::new(),
        FakeNotifyAdapter::new(),
        state.clone(),
        Arc::new(AlarmInventory::new(AlarmStore::open_in_memory().unwrap())),
        Arc::new(Mutex::new(crate::scheduler::Scheduler::new())),
        Arc::new(crate::backup::BackupCoordinator::new()),
        FakeClock::new(),
        tx,
    );
    let (wal_tx, _wal_rx) = mpsc::channel(64);
    let synchronizer = Synchronizer::new(
        executor,
        FakeConnectivityTracker::new(online),
        power.clone(),
        SequentialIdGen::new("session"),
        false,
        retry_policy,
        wal_tx,
    );
    (synchronizer, state, power, rx)
}

fn scheduled_profile(name: &str) -> Profile {
    let mut profile = Profile::new(name, format!("{name}-client"));
    profile.sync_type = SyncType::Scheduled;
    profile
        .storage_names
        .insert(syncd_core::StorageName::new(format!("{name}-storage")));
    profile
}

#[tokio::test]
async fn start_queues_and_drains_a_manual_session() {
    let (sync, state, _power, _rx) = synchronizer(true);
    let profile = scheduled_profile("calendar");
    state.lock().profiles.insert(profile.name.as_str().to_string(), profile);

    sync.start("calendar").await.unwrap();

    let state = state.lock();
    assert!(state.session_queue.is_empty());
    let session = state.sessions.values().next().unwrap();
    assert_eq!(session.state, syncd_core::SessionState::Running);
    assert_eq!(
        state.reserved_storages.get("calendar-storage").map(String::as_str),
        Some("calendar-client")
    );
}

#[tokio::test]
async fn start_unknown_profile_errors() {
    let (sync, _state, _power, _rx) = synchronizer(true);
    let result = sync.start("nope").await;
    assert!(matches!(result, Err(EngineError::UnknownProfile(_))));
}

#[tokio::test]
async fn start_scheduled_offline_marks_waiting_and_emits_not_possible() {
    let (sync, state, _power, _rx) = synchronizer(false);
    let profile = scheduled_profile("contacts");
    state.lock().profiles.insert(profile.name.as_str().to_string(), profile);

    sync.start_scheduled("contacts").await.unwrap();

    assert!(state.lock().waiting_for_online.contains("contacts"));
    assert!(state.lock().sessions.is_empty());
}

#[tokio::test]
async fn start_scheduled_low_battery_fails_before_queueing() {
    let (sync, state, power, _rx) = synchronizer(true);
    let profile = scheduled_profile("notes");
    state.lock().profiles.insert(profile.name.as_str().to_string(), profile);
    power.set_low_battery(true);

    sync.start_scheduled("notes").await.unwrap();

    assert!(state.lock().sessions.is_empty());
    assert!(!state.lock().waiting_for_online.contains("notes"));
}

#[tokio::test]
async fn second_profile_with_same_client_waits_behind_first() {
    let (sync, state, _power, _rx) = synchronizer(true);
    let mut a = scheduled_profile("a");
    let mut b = scheduled_profile("b");
    b.client_profile_name = a.client_profile_name.clone();
    a.sync_type = SyncType::Manual;
    b.sync_type = SyncType::Manual;
    state.lock().profiles.insert(a.name.as_str().to_string(), a);
    state.lock().profiles.insert(b.name.as_str().to_string(), b);

    sync.start("a").await.unwrap();
    sync.start("b").await.unwrap();

    let state = state.lock();
    assert_eq!(state.session_queue.len(), 1);
    let queued = state.sessions.get(&state.session_queue[0]).unwrap();
    assert_eq!(queued.profile.name.as_str(), "b");
}

#[tokio::test]
async fn on_profile_changed_added_arms_coalescing_timer() {
    let (sync, _state, _power, _rx) = synchronizer(true);
    sync.on_profile_changed("fresh", ProfileChangeKind::Added).await.unwrap();
    assert!(sync.executor.scheduler().lock().has_timers());
}

#[tokio::test]
async fn on_profile_changed_removed_cancels_pending_change() {
    let (sync, _state, _power, _rx) = synchronizer(true);
    sync.on_profile_changed("gone", ProfileChangeKind::Added).await.unwrap();
    sync.on_profile_changed("gone", ProfileChangeKind::Removed).await.unwrap();
    assert!(sync.pending_profile_changes.lock().get("gone").is_none());
}

#[tokio::test]
async fn refresh_external_sync_emits_on_transition() {
    let (sync, state, _power, _rx) = synchronizer(true);
    let mut profile = scheduled_profile("ext");
    profile.sync_externally_enabled = true;
    state.lock().profiles.insert(profile.name.as_str().to_string(), profile);

    sync.refresh_external_sync("ext", false).await.unwrap();

    // Keyed by profile name (§4.7's profileName -> isExternallySynced),
    // not by the distinct client_profile_name ("ext-client").
    assert_eq!(state.lock().externally_synced.get("ext"), Some(&true));
}

#[tokio::test]
async fn refresh_external_sync_is_stable_across_repeated_calls() {
    let (sync, state, _power, _rx) = synchronizer(true);
    let mut profile = scheduled_profile("ext");
    profile.sync_externally_enabled = true;
    state.lock().profiles.insert(profile.name.as_str().to_string(), profile);

    sync.refresh_external_sync("ext", false).await.unwrap();
    sync.refresh_external_sync("ext", false).await.unwrap();

    assert_eq!(state.lock().externally_synced.get("ext"), Some(&true));
}

#[tokio::test]
async fn choose_inbound_profile_prefers_visible_enabled() {
    let (sync, _state, _power, _rx) = synchronizer(true);
    let mut hidden = scheduled_profile("hidden");
    hidden.hidden = true;
    let visible = scheduled_profile("visible");

    let chosen = sync.choose_inbound_profile(vec![hidden, visible.clone()], "peer");
    assert_eq!(chosen.name, visible.name);
}

#[tokio::test]
async fn choose_inbound_profile_synthesizes_when_empty() {
    let (sync, _state, _power, _rx) = synchronizer(true);
    let chosen = sync.choose_inbound_profile(Vec::new(), "peer-device");
    assert!(chosen.created_for_session);
    assert_eq!(
        chosen.key_values.get("display_name").map(String::as_str),
        Some("peer-device")
    );
}

#[tokio::test]
async fn abort_queued_session_finishes_as_cancelled() {
    let (sync, state, _power, _rx) = synchronizer(true);
    let mut a = scheduled_profile("busy");
    let mut b = scheduled_profile("pending");
    b.client_profile_name = a.client_profile_name.clone();
    a.sync_type = SyncType::Manual;
    b.sync_type = SyncType::Manual;
    state.lock().profiles.insert(a.name.as_str().to_string(), a);
    state.lock().profiles.insert(b.name.as_str().to_string(), b);

    sync.start("busy").await.unwrap();
    sync.start("pending").await.unwrap();
    sync.abort("pending").await.unwrap();

    assert!(state.lock().sessions.values().all(|s| s.profile.name.as_str() != "pending"));
}

#[tokio::test]
async fn backup_start_stops_active_sessions_and_resolves_when_idle() {
    let (sync, state, _power, _rx) = synchronizer(true);
    assert!(!state.lock().backup_active);

    sync.backup_start(syncd_core::BackupReplyKind::BackupStart).await.unwrap();
    assert!(state.lock().backup_active);
}

#[tokio::test]
async fn backup_finish_clears_backup_active() {
    let (sync, state, _power, _rx) = synchronizer(true);
    sync.backup_start(syncd_core::BackupReplyKind::BackupStart).await.unwrap();
    sync.backup_finish(syncd_core::BackupReplyKind::BackupDone).await.unwrap();
    assert!(!state.lock().backup_active);
}

#[tokio::test]
async fn backup_start_delays_the_reply_until_the_last_active_session_drains() {
    let (sync, state, _power, _rx) = synchronizer(true);
    let profile = scheduled_profile("calendar");
    state.lock().profiles.insert(profile.name.as_str().to_string(), profile);
    sync.start("calendar").await.unwrap();
    let session_id = state.lock().sessions.keys().next().unwrap().clone();

    let reply = sync.backup().register(syncd_core::BackupReplyKind::BackupStart);
    sync.backup_start(syncd_core::BackupReplyKind::BackupStart).await.unwrap();

    // The session is still active (stop was merely requested), so the
    // delayed reply must not have resolved yet.
    assert!(reply.try_recv().is_err());

    sync.on_session_finished(&session_id, syncd_core::SyncStatus::Cancelled, None, None)
        .await
        .unwrap();

    reply.await.expect("reply resolves once the last active session drains");
}

#[tokio::test]
async fn on_session_finished_retries_scheduled_errors_until_the_policy_is_exhausted() {
    let policy = crate::sync_scheduler::RetryPolicy {
        backoff: Duration::from_secs(42),
        max_retries: 1,
    };
    let (sync, state, _power, _rx) = synchronizer_with_retry_policy(true, policy);
    let profile = scheduled_profile("flaky");
    state.lock().profiles.insert(profile.name.as_str().to_string(), profile);

    // First ERROR: retry_count starts at 0, below max_retries, so a short
    // backoff alarm is armed instead of falling back to the schedule.
    sync.start("flaky").await.unwrap();
    let session_id = state.lock().sessions.keys().next().unwrap().clone();
    sync.on_session_finished(&session_id, syncd_core::SyncStatus::Error, None, None)
        .await
        .unwrap();
    assert_eq!(state.lock().profiles["flaky"].retry_count, 1);
    let backoff_deadline = sync.alarms().next_deadline().unwrap().unwrap();
    assert_eq!(backoff_deadline, sync.now() + Duration::from_secs(42));

    // Second ERROR: retry_count is now 1, at max_retries, so the scheduler
    // falls back to the profile's normal schedule (a 1-hour default
    // interval) rather than arming another 42s backoff.
    sync.start("flaky").await.unwrap();
    let session_id = state.lock().sessions.keys().next().unwrap().clone();
    sync.on_session_finished(&session_id, syncd_core::SyncStatus::Error, None, None)
        .await
        .unwrap();
    assert_eq!(state.lock().profiles["flaky"].retry_count, 2);
    let fallback_deadline = sync.alarms().next_deadline().unwrap().unwrap();
    assert_ne!(fallback_deadline, sync.now() + Duration::from_secs(42));
}

#[tokio::test]
async fn on_alarm_fired_starts_a_scheduled_sync() {
    let (sync, state, _power, _rx) = synchronizer(true);
    let profile = scheduled_profile("alarmed");
    state.lock().profiles.insert(profile.name.as_str().to_string(), profile);

    sync.on_alarm_fired("alarmed").await.unwrap();

    assert!(!state.lock().sessions.is_empty());
}

#[tokio::test]
async fn on_timer_fired_dispatches_sync_on_change() {
    let (sync, state, _power, _rx) = synchronizer(true);
    let profile = scheduled_profile("soc");
    state.lock().profiles.insert(profile.name.as_str().to_string(), profile.clone());
    state.lock().sync_on_change_pending.insert(profile.name.as_str().to_string());

    sync.on_timer_fired(&syncd_core::TimerId::sync_on_change(profile.name.as_str())).await.unwrap();

    assert!(!state.lock().sessions.is_empty());
    assert!(!state.lock().sync_on_change_pending.contains(profile.name.as_str()));
}

#[tokio::test]
async fn on_timer_fired_ignores_unknown_prefix_profile() {
    let (sync, _state, _power, _rx) = synchronizer(true);
    // No matching profile exists; on_timer_fired should surface the
    // underlying UnknownProfile error rather than silently succeed when
    // the timer id clearly names a profile-scoped timer.
    let result = sync.on_timer_fired(&syncd_core::TimerId::rush_switch("ghost")).await;
    assert!(matches!(result, Err(EngineError::UnknownProfile(_))));
}
