use super::*;
use chrono::Duration as ChronoDuration;

#[test]
fn add_alarm_returns_real_autoincrement_ids() {
    let store = AlarmStore::open_in_memory().unwrap();
    let now = Utc::now();
    let a = store.add_alarm(now, "calendar").unwrap();
    let b = store.add_alarm(now + ChronoDuration::seconds(10), "contacts").unwrap();
    assert_ne!(a, b);
    assert!(b > a);
}

#[test]
fn list_alarms_orders_by_fire_time() {
    let store = AlarmStore::open_in_memory().unwrap();
    let now = Utc::now();
    store.add_alarm(now + ChronoDuration::seconds(20), "b").unwrap();
    store.add_alarm(now + ChronoDuration::seconds(10), "a").unwrap();
    store.add_alarm(now + ChronoDuration::seconds(15), "c").unwrap();

    let rows = store.list_alarms().unwrap();
    let profiles: Vec<_> = rows.iter().map(|r| r.profile.as_str()).collect();
    assert_eq!(profiles, vec!["a", "c", "b"]);
}

#[test]
fn remove_alarm_drops_only_that_row() {
    let store = AlarmStore::open_in_memory().unwrap();
    let id = store.add_alarm(Utc::now(), "calendar").unwrap();
    store.add_alarm(Utc::now(), "contacts").unwrap();

    store.remove_alarm(id).unwrap();
    let rows = store.list_alarms().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].profile, "contacts");
}

#[test]
fn remove_alarms_for_profile_enforces_single_entry_invariant() {
    let store = AlarmStore::open_in_memory().unwrap();
    store.add_alarm(Utc::now(), "calendar").unwrap();
    store.remove_alarms_for_profile("calendar").unwrap();
    store.add_alarm(Utc::now(), "calendar").unwrap();

    let rows = store.list_alarms().unwrap();
    assert_eq!(rows.iter().filter(|r| r.profile == "calendar").count(), 1);
}

#[test]
fn open_truncates_stale_rows_from_a_previous_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alarms.db");

    {
        let store = AlarmStore::open(&path).unwrap();
        store.add_alarm(Utc::now(), "calendar").unwrap();
    }

    let store = AlarmStore::open(&path).unwrap();
    assert!(store.list_alarms().unwrap().is_empty());
}
