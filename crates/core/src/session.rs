// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SyncSession: the per-run state machine (§4.2).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::define_id;
use crate::profile::{ClientProfileName, Profile, ProfileName, StorageName};
use crate::result::SyncResult;

define_id! {
    /// Identifies one sync session (one invocation of sync for one profile).
    pub struct SessionId;
}

/// How the session came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionDirection {
    /// Initiated locally (manual, scheduled, or sync-on-change).
    Outbound,
    /// A peer connected to us; the profile may have been synthesized.
    Inbound,
}

/// §4.2 state machine. Enum ordering mirrors the table's enter-on column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    Reserved,
    Starting,
    Running,
    Done,
    Error,
    Cancelled,
    Aborted,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Done | SessionState::Error | SessionState::Cancelled | SessionState::Aborted
        )
    }

    /// Valid exits per the §4.2 table. Used defensively by the state machine
    /// to reject transitions that do not belong to the spec'd graph.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Created, Reserved)
                | (Created, Error)
                | (Reserved, Starting)
                | (Reserved, Error)
                | (Starting, Running)
                | (Starting, Error)
                | (Running, Done)
                | (Running, Error)
                | (Running, Cancelled)
                | (Running, Aborted)
        )
    }
}

/// One active or recently-terminal sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSession {
    pub id: SessionId,
    pub profile: Profile,
    pub direction: SessionDirection,
    pub scheduled: bool,
    pub state: SessionState,
    pub reserved_storages: BTreeSet<StorageName>,
    pub result: Option<SyncResult>,
    /// True when `profile` was synthesized for an inbound session and must be
    /// discarded (rather than persisted) if the session never reaches DONE.
    pub created_profile: bool,
}

impl SyncSession {
    pub fn new(id: SessionId, profile: Profile, direction: SessionDirection, scheduled: bool) -> Self {
        let created_profile = profile.created_for_session;
        Self {
            id,
            profile,
            direction,
            scheduled,
            state: SessionState::Created,
            reserved_storages: BTreeSet::new(),
            result: None,
            created_profile,
        }
    }

    pub fn profile_name(&self) -> &ProfileName {
        &self.profile.name
    }

    pub fn client_profile_name(&self) -> &ClientProfileName {
        &self.profile.client_profile_name
    }

    pub fn storage_names(&self) -> &BTreeSet<StorageName> {
        &self.profile.storage_names
    }

    /// Attempt a transition, returning whether it was accepted. Rejected
    /// transitions leave state untouched; callers treat this as a logic bug,
    /// not a recoverable error, since the orchestrator is the only caller.
    pub fn transition(&mut self, next: SessionState) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        if next == SessionState::Reserved {
            self.reserved_storages = self.profile.storage_names.clone();
        }
        self.state = next;
        true
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
