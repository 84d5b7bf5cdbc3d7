// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ExternalSyncRegistry (§4.7): tracks which profiles are delegated to an
//! external syncer and broadcasts status changes.

use std::time::SystemTime;

use syncd_core::{Effect, Event, Profile};
use syncd_storage::MaterializedState;

/// The externally-synced value `profile` should currently have, or `None`
/// if no external-sync policy applies at all (the "remove entry" case).
fn expected_value(state: &MaterializedState, profile: &Profile, now: SystemTime) -> Option<bool> {
    if state.backup_active {
        return Some(false);
    }
    if profile.sync_externally_enabled {
        return Some(true);
    }
    if profile.sync_externally_during_rush {
        return Some(profile.in_external_rush_period(now));
    }
    None
}

fn emit(profile: &Profile, value: bool) -> Effect {
    Effect::Emit {
        event: Event::SyncedExternallyStatus {
            profile: profile.name.clone(),
            account_id: profile.key_values.get("account_id").cloned().unwrap_or_default(),
            client_profile_name: profile.client_profile_name.clone(),
            externally_synced: value,
        },
    }
}

/// Re-evaluate `profile` against current state. `force` models an explicit
/// query, which emits even when the value did not change.
pub fn evaluate(state: &MaterializedState, profile: &Profile, now: SystemTime, force: bool) -> Option<Effect> {
    let current = state.externally_synced.get(profile.name.as_str()).copied();

    let Some(expected) = expected_value(state, profile, now) else {
        // No policy applies: remove the entry, emitting false only if it
        // transitions from a previously-true value.
        return (current == Some(true)).then(|| emit(profile, false));
    };

    if current != Some(expected) || force {
        Some(emit(profile, expected))
    } else {
        None
    }
}

#[cfg(test)]
#[path = "external_sync_tests.rs"]
mod tests;
