// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SyncOnChangeCoordinator (§4.5): a per-profile debounced timer triggered
//! by storage change notifications. Stateless here; pending-ness lives in
//! `MaterializedState::sync_on_change_pending` so it survives a restart the
//! same way everything else derived from the event log does.

use syncd_core::{Effect, Event, Profile, ProfileName, TimerId};
use syncd_storage::MaterializedState;

/// A storage changed for `profile`. Adding a profile that already has a
/// pending timer is a no-op (invariant: at most one pending SOC timer).
pub fn notify(state: &MaterializedState, profile: &Profile) -> Vec<Effect> {
    if state.sync_on_change_pending.contains(profile.name.as_str()) {
        return Vec::new();
    }
    vec![
        Effect::Emit {
            event: Event::SyncOnChangePending {
                profile: profile.name.clone(),
            },
        },
        Effect::SetTimer {
            id: TimerId::sync_on_change(profile.name.as_str()),
            duration: profile.sync_on_change_after,
        },
    ]
}

/// The debounce timer elapsed: emit the fire signal, which also dequeues the
/// pending entry (`MaterializedState::apply_event`) atomically with respect
/// to a concurrent cancel.
pub fn fire(profile: &ProfileName) -> Effect {
    Effect::Emit {
        event: Event::SyncOnChangeFired {
            profile: profile.clone(),
        },
    }
}

/// Cancel any pending timer for `profile` — profile removal/modification,
/// where `MaterializedState::sync_on_change_pending` is already cleared by
/// the caller through other means (e.g. `ProfileChanged::Removed`).
pub fn cancel(profile: &ProfileName) -> Effect {
    Effect::CancelTimer {
        id: TimerId::sync_on_change(profile.as_str()),
    }
}

/// Cancel any pending timer for `profile` because a manual or scheduled
/// start preempted it. Unlike `cancel`, this also clears the pending
/// marker — without it, `sync_on_change_pending` would stay set forever
/// and every future `notify` call for this profile would silently no-op.
pub fn cancel_for_preemption(profile: &ProfileName) -> Vec<Effect> {
    vec![
        Effect::CancelTimer {
            id: TimerId::sync_on_change(profile.as_str()),
        },
        Effect::Emit {
            event: Event::SyncOnChangeCancelled {
                profile: profile.clone(),
            },
        },
    ]
}

#[cfg(test)]
#[path = "sync_on_change_tests.rs"]
mod tests;
