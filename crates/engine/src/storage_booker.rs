// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! StorageBooker (§4.1): a small concurrency arbiter over named storages.
//!
//! No locking of its own — the orchestrator is single-threaded cooperative
//! (§5), so these functions operate directly on the reservation map living
//! in `MaterializedState` rather than owning a copy of it.

use std::collections::{BTreeSet, HashMap};

use syncd_core::StorageName;

/// All-or-nothing reserve: succeeds iff none of `storages` is currently
/// held, by `owner` or anyone else. On success records `storage -> owner`
/// for every listed name.
pub fn reserve(reservations: &mut HashMap<String, String>, storages: &BTreeSet<StorageName>, owner: &str) -> bool {
    if storages.iter().any(|s| reservations.contains_key(s.as_str())) {
        return false;
    }
    for storage in storages {
        reservations.insert(storage.as_str().to_string(), owner.to_string());
    }
    true
}

/// Unconditionally drop reservations for `storages`.
pub fn release(reservations: &mut HashMap<String, String>, storages: &BTreeSet<StorageName>) {
    for storage in storages {
        reservations.remove(storage.as_str());
    }
}

/// Single-storage reserve, used by plugins for intra-session storage
/// handoff.
pub fn reserve_one(reservations: &mut HashMap<String, String>, name: &StorageName, owner: &str) -> bool {
    if reservations.contains_key(name.as_str()) {
        return false;
    }
    reservations.insert(name.as_str().to_string(), owner.to_string());
    true
}

pub fn release_one(reservations: &mut HashMap<String, String>, name: &StorageName) {
    reservations.remove(name.as_str());
}

/// Storages from `storages` that are currently held by someone, used by the
/// drain loop to decide whether to leave the queue head in place.
pub fn conflicts(reservations: &HashMap<String, String>, storages: &BTreeSet<StorageName>) -> Vec<StorageName> {
    storages
        .iter()
        .filter(|s| reservations.contains_key(s.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "storage_booker_tests.rs"]
mod tests;
