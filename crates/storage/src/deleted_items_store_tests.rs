use super::*;
use chrono::Duration as ChronoDuration;

#[test]
fn set_snapshot_replaces_all_rows() {
    let mut store = DeletedItemsStore::open_in_memory().unwrap();
    let now = Utc::now();
    store
        .set_snapshot(&[SnapshotItem {
            item_id: "a".into(),
            creation_time: now,
        }])
        .unwrap();
    store
        .set_snapshot(&[SnapshotItem {
            item_id: "b".into(),
            creation_time: now,
        }])
        .unwrap();

    let items = store.get_snapshot().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item_id, "b");
}

#[test]
fn get_deleted_items_filters_by_creation_and_delete_window() {
    let mut store = DeletedItemsStore::open_in_memory().unwrap();
    let now = Utc::now();

    // created before `since`, deleted after `since`: should match
    store
        .add_deleted_items(&[DeletedItem {
            item_id: "matches".into(),
            creation_time: now - ChronoDuration::hours(2),
            delete_time: now + ChronoDuration::hours(1),
        }])
        .unwrap();

    // created after `since`: should not match
    store
        .add_deleted_items(&[DeletedItem {
            item_id: "too-new".into(),
            creation_time: now + ChronoDuration::minutes(5),
            delete_time: now + ChronoDuration::hours(2),
        }])
        .unwrap();

    // deleted before `since`: should not match
    store
        .add_deleted_items(&[DeletedItem {
            item_id: "already-gone".into(),
            creation_time: now - ChronoDuration::hours(3),
            delete_time: now - ChronoDuration::hours(1),
        }])
        .unwrap();

    let rows = store.get_deleted_items(now).unwrap();
    let ids: Vec<_> = rows.iter().map(|(id, ..)| id.as_str()).collect();
    assert_eq!(ids, vec!["matches"]);
}

#[test]
fn add_deleted_items_is_idempotent_on_replay() {
    let mut store = DeletedItemsStore::open_in_memory().unwrap();
    let now = Utc::now();
    let item = DeletedItem {
        item_id: "x".into(),
        creation_time: now - ChronoDuration::hours(1),
        delete_time: now + ChronoDuration::hours(1),
    };
    store.add_deleted_items(&[item.clone()]).unwrap();
    store.add_deleted_items(&[item]).unwrap();

    let rows = store.get_deleted_items(now).unwrap();
    assert_eq!(rows.len(), 1);
}
