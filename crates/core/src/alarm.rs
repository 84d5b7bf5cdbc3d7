// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alarm: one armed wake-up, persisted so it survives restart/suspend.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::profile::ProfileName;

/// Row id from the `alarms` table (`AUTOINCREMENT`, so always real and
/// unique across restarts — there is no placeholder-id path, see SPEC_FULL.md
/// §9 Open Questions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AlarmId(pub i64);

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    pub id: AlarmId,
    pub fire_at: SystemTime,
    pub profile: ProfileName,
}

#[cfg(test)]
#[path = "alarm_tests.rs"]
mod tests;
