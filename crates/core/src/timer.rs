// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory timer identities: rush-switch, sync-on-change debounce and
//! profile-change coalescing all share one `Scheduler` keyed by string id, so
//! each kind gets a namespaced prefix the same way `SetTimer`/`CancelTimer`
//! effects do in the engine.

use crate::define_id;

define_id! {
    /// Identifies one in-memory timer armed with the engine `Scheduler`.
    pub struct TimerId;
}

const RUSH_SWITCH_PREFIX: &str = "rush-switch:";
const SOC_PREFIX: &str = "soc:";
const PROFILE_CHANGE_PREFIX: &str = "profile-change:";

impl TimerId {
    pub fn rush_switch(profile: &str) -> Self {
        Self::new(format!("{RUSH_SWITCH_PREFIX}{profile}"))
    }

    pub fn sync_on_change(profile: &str) -> Self {
        Self::new(format!("{SOC_PREFIX}{profile}"))
    }

    pub fn profile_change_coalesce(profile: &str) -> Self {
        Self::new(format!("{PROFILE_CHANGE_PREFIX}{profile}"))
    }

    pub fn is_rush_switch(&self) -> bool {
        self.as_str().starts_with(RUSH_SWITCH_PREFIX)
    }

    pub fn is_sync_on_change(&self) -> bool {
        self.as_str().starts_with(SOC_PREFIX)
    }

    pub fn is_profile_change_coalesce(&self) -> bool {
        self.as_str().starts_with(PROFILE_CHANGE_PREFIX)
    }

    /// Recover the profile name this timer was armed for, if it is one of
    /// the prefixed kinds above.
    pub fn profile_name(&self) -> Option<&str> {
        for prefix in [RUSH_SWITCH_PREFIX, SOC_PREFIX, PROFILE_CHANGE_PREFIX] {
            if let Some(rest) = self.as_str().strip_prefix(prefix) {
                return Some(rest);
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
