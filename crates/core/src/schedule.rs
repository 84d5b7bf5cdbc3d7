// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-profile schedule math: plain interval plus an optional rush window.

use std::time::{Duration, SystemTime};

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// A weekday-masked, time-of-day-bounded window with its own shorter interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RushWindow {
    /// Bit `i` (0 = Monday .. 6 = Sunday) set means the window applies that day.
    pub weekday_mask: u8,
    /// Seconds since midnight, local interpretation left to the caller (UTC here).
    pub start_secs: u32,
    pub end_secs: u32,
    pub interval: Duration,
}

impl RushWindow {
    fn weekday_bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    fn day_enabled(&self, day: Weekday) -> bool {
        self.weekday_mask & Self::weekday_bit(day) != 0
    }

    fn seconds_of_day(dt: DateTime<Utc>) -> u32 {
        dt.hour() * 3600 + dt.minute() * 60 + dt.second()
    }

    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        if !self.day_enabled(now.weekday()) {
            return false;
        }
        let secs = Self::seconds_of_day(now);
        secs >= self.start_secs && secs < self.end_secs
    }

    /// Next instant at which `contains()` would flip, scanning forward.
    pub fn next_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let day_start = now.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();
        for day_offset in 0..9i64 {
            let day = day_start + chrono::Duration::days(day_offset);
            if !self.day_enabled(day.weekday()) {
                continue;
            }
            for boundary_secs in [self.start_secs, self.end_secs] {
                let candidate = day + chrono::Duration::seconds(boundary_secs as i64);
                if candidate > now {
                    return candidate;
                }
            }
        }
        // No enabled weekday in the mask: never switches: park far in the future.
        now + chrono::Duration::days(365)
    }
}

/// Periodic schedule for a profile, with an optional rush override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub interval: Duration,
    pub rush: Option<RushWindow>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            rush: None,
        }
    }
}

impl Schedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            rush: None,
        }
    }

    pub fn with_rush(mut self, rush: RushWindow) -> Self {
        self.rush = Some(rush);
        self
    }

    pub fn is_rush(&self, now: SystemTime) -> bool {
        match &self.rush {
            Some(rush) => rush.contains(now.into()),
            None => false,
        }
    }

    fn effective_interval(&self, now: SystemTime) -> Duration {
        match &self.rush {
            Some(rush) if rush.contains(now.into()) => rush.interval,
            _ => self.interval,
        }
    }

    /// Next instant this profile should fire, given its last sync time.
    ///
    /// A profile never synced fires immediately. Otherwise the next fire is
    /// `last_sync + effective_interval`; if that has already elapsed the
    /// profile fires immediately (catch-up), which keeps schedule
    /// monotonicity (`fire_{i+1} >= fire_i + minInterval`) while never
    /// scheduling into the past.
    pub fn next_fire(&self, last_sync_time: Option<SystemTime>, now: SystemTime) -> SystemTime {
        let interval = self.effective_interval(now);
        match last_sync_time {
            None => now,
            Some(last) => {
                let candidate = last + interval;
                if candidate <= now {
                    now
                } else {
                    candidate
                }
            }
        }
    }

    /// Next instant at which the rush/non-rush state changes, if this
    /// schedule has a rush window at all.
    pub fn next_rush_switch(&self, now: SystemTime) -> Option<SystemTime> {
        let rush = self.rush.as_ref()?;
        let boundary: DateTime<Utc> = rush.next_boundary(now.into());
        Some(boundary.into())
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
