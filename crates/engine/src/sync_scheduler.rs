// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SyncScheduler (§4.3): decides *when* to wake for a profile and expresses
//! that decision as effects for the executor to carry out. Pure function of
//! profile + now; no state of its own beyond what the profile/schedule
//! already carry.

use std::time::{Duration, SystemTime};

use syncd_core::{Effect, Profile, ProfileName, SyncType, TimerId};

/// Per-profile retry policy (§7): how long to wait before a retry attempt,
/// and how many consecutive ERROR results are tolerated before the
/// scheduler falls back to the profile's normal schedule instead.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub backoff: Duration,
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(300),
            max_retries: 3,
        }
    }
}

/// Whether another scheduled-sync attempt is permitted for a profile whose
/// consecutive ERROR count (before this one is recorded) is `retry_count`.
pub fn retry_permitted(policy: &RetryPolicy, retry_count: u32) -> bool {
    retry_count < policy.max_retries
}

/// `nextFire(profile, lastSyncTime, now)` from §4.3, expressed as the
/// effects needed to realize the decision rather than a bare instant.
pub fn next_fire(profile: &Profile, now: SystemTime) -> Vec<Effect> {
    let mut effects = Vec::new();

    if !profile.enabled || profile.sync_type != SyncType::Scheduled {
        effects.push(Effect::DeleteAlarm {
            profile: profile.name.clone(),
        });
        effects.push(Effect::CancelTimer {
            id: TimerId::rush_switch(profile.name.as_str()),
        });
        return effects;
    }

    let t = profile.schedule.next_fire(profile.last_sync_time, now);

    if profile.in_external_rush_period(now) && profile.sync_externally_during_rush {
        // Skip arming the normal alarm; re-evaluation happens at the rush
        // boundary via the rush-switch timer armed below.
        effects.push(Effect::DeleteAlarm {
            profile: profile.name.clone(),
        });
    } else {
        let fire_at = t.max(now + Duration::from_secs(1));
        effects.push(Effect::PersistAlarm {
            profile: profile.name.clone(),
            fire_at,
        });
    }

    if let Some(switch) = profile.schedule.next_rush_switch(now) {
        let duration = switch.duration_since(now).unwrap_or(Duration::ZERO);
        effects.push(Effect::SetTimer {
            id: TimerId::rush_switch(profile.name.as_str()),
            duration,
        });
    }

    effects
}

/// Override the schedule-derived next fire with an explicit retry instant,
/// used after the profile's session terminated in ERROR.
pub fn add_profile_for_sync_retry(profile: &ProfileName, when: SystemTime) -> Effect {
    Effect::PersistAlarm {
        profile: profile.clone(),
        fire_at: when,
    }
}

#[cfg(test)]
#[path = "sync_scheduler_tests.rs"]
mod tests;
