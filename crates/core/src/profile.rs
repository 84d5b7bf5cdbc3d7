// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Profile: the read-only configuration snapshot a sync session runs against.

use std::collections::{BTreeSet, HashMap};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::result::SyncResult;
use crate::schedule::Schedule;
use crate::{define_id, ShortId};

define_id! {
    /// Unique, restart-stable profile name (the mutual-exclusion-free identity).
    pub struct ProfileName;
}

define_id! {
    /// Identifies the plugin implementing the client role; the mutual-exclusion
    /// key for "one sync per client type".
    pub struct ClientProfileName;
}

define_id! {
    /// Named local data source, e.g. `hcontacts`.
    pub struct StorageName;
}

/// How a sync for this profile may be initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    Manual,
    Scheduled,
}

/// Whether the remote end is a cloud service or another device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationType {
    Online,
    Device,
}

/// Transport class used for a connectivity change or an `allowedInternetTypes` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternetType {
    Wifi,
    Ethernet,
    Cellular,
    Unknown,
}

/// A read-only snapshot of one sync relationship's configuration.
///
/// Sessions operate on an owned clone taken at start; edits to the profile
/// store afterwards do not affect an in-flight session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: ProfileName,
    pub enabled: bool,
    pub hidden: bool,
    pub sync_type: SyncType,
    pub destination_type: DestinationType,
    pub client_profile_name: ClientProfileName,
    pub storage_names: BTreeSet<StorageName>,
    pub schedule: Schedule,
    pub allowed_internet_types: BTreeSet<InternetType>,
    pub last_sync_time: Option<SystemTime>,
    pub last_successful_sync_time: Option<SystemTime>,
    pub last_result: Option<SyncResult>,
    pub sync_externally_enabled: bool,
    pub sync_externally_during_rush: bool,
    /// Debounce delay used by the sync-on-change coordinator for this profile.
    pub sync_on_change_after: std::time::Duration,
    /// Free-form metadata (account id, Bluetooth address, UUID, ...).
    #[serde(default)]
    pub key_values: HashMap<String, String>,
    /// True for a profile synthesized for an inbound session with an unknown
    /// peer; must be dropped by the orchestrator if the session is cancelled.
    #[serde(default)]
    pub created_for_session: bool,
    /// Consecutive scheduled-sync ERROR count since the last DONE. Consulted
    /// by the retry policy to decide whether another attempt is permitted;
    /// resets to zero on DONE.
    #[serde(default)]
    pub retry_count: u32,
}

impl Profile {
    pub fn new(name: impl Into<String>, client_profile_name: impl Into<String>) -> Self {
        Self {
            name: ProfileName::new(name),
            enabled: true,
            hidden: false,
            sync_type: SyncType::Manual,
            destination_type: DestinationType::Online,
            client_profile_name: ClientProfileName::new(client_profile_name),
            storage_names: BTreeSet::new(),
            schedule: Schedule::default(),
            allowed_internet_types: BTreeSet::new(),
            last_sync_time: None,
            last_successful_sync_time: None,
            last_result: None,
            sync_externally_enabled: false,
            sync_externally_during_rush: false,
            sync_on_change_after: std::time::Duration::from_secs(30),
            key_values: HashMap::new(),
            created_for_session: false,
            retry_count: 0,
        }
    }

    /// True while `now` sits inside a rush window that also carries an
    /// external-sync-during-rush policy.
    pub fn in_external_rush_period(&self, now: SystemTime) -> bool {
        self.schedule.is_rush(now)
    }

    pub fn short_name(&self) -> &str {
        self.name.short(12)
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
