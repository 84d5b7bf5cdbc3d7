// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AlarmInventory (§4.3, §6): the persistent priority queue of future
//! wake-up instants backing the scheduler's non-keepalive fallback path.
//!
//! Rather than duplicate a min-heap in memory, the head and the fired set
//! are derived fresh from `AlarmStore::list_alarms`, which already returns
//! rows ordered by `synctime` ascending. At daemon scale (tens of profiles)
//! this is cheaper than it sounds and keeps a single source of truth,
//! mirroring the engine's own `Scheduler` being a flat map scanned for a
//! minimum rather than a dedicated heap structure.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

use syncd_core::{AlarmId, Event, ProfileName};
use syncd_storage::{AlarmStore, AlarmStoreError};

fn to_utc(t: SystemTime) -> DateTime<Utc> {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => DateTime::from_timestamp(d.as_secs() as i64, d.subsec_nanos()).unwrap_or_else(Utc::now),
        Err(_) => Utc::now(),
    }
}

fn from_utc(t: DateTime<Utc>) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(t.timestamp().max(0) as u64)
}

/// Wraps the SQLite-backed alarm table with the invariant (§3) that at most
/// one alarm is armed per profile at a time.
pub struct AlarmInventory {
    store: AlarmStore,
}

impl AlarmInventory {
    pub fn new(store: AlarmStore) -> Self {
        Self { store }
    }

    /// Arm a wake-up for `profile`, replacing any alarm already armed for it.
    pub fn arm(&self, profile: &ProfileName, fire_at: SystemTime) -> Result<(), AlarmStoreError> {
        self.store.remove_alarms_for_profile(profile.as_str())?;
        self.store.add_alarm(to_utc(fire_at), profile.as_str())?;
        Ok(())
    }

    /// Remove any alarm armed for `profile` (fired, superseded, or disabled).
    pub fn disarm(&self, profile: &ProfileName) -> Result<(), AlarmStoreError> {
        self.store.remove_alarms_for_profile(profile.as_str())
    }

    /// The instant of the earliest armed alarm, if any.
    pub fn next_deadline(&self) -> Result<Option<SystemTime>, AlarmStoreError> {
        Ok(self.store.list_alarms()?.into_iter().next().map(|row| from_utc(row.fire_at)))
    }

    /// Pop and return every alarm whose `fire_at <= now`, in ascending
    /// fire-time order — the race described in §4.3: the head may have
    /// advanced past `now` by the time the wake fires, so every elapsed
    /// alarm is delivered before a new one is armed.
    pub fn fired_alarms(&self, now: SystemTime) -> Result<Vec<Event>, AlarmStoreError> {
        let rows = self.store.list_alarms()?;
        let mut fired = Vec::new();
        for row in rows {
            let fire_at = from_utc(row.fire_at);
            if fire_at > now {
                break;
            }
            self.store.remove_alarm(row.id)?;
            fired.push(Event::AlarmFired {
                alarm_id: AlarmId(row.id),
                profile: ProfileName::new(row.profile),
            });
        }
        Ok(fired)
    }
}

#[cfg(test)]
#[path = "alarm_inventory_tests.rs"]
mod tests;
