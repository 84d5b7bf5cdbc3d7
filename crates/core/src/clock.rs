// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time abstraction so schedule math and the orchestrator's drain loop are
//! deterministic under test.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of time for everything that needs `now()`.
///
/// The orchestrator, scheduler and alarm inventory never call
/// `Instant::now()`/`SystemTime::now()` directly; they go through this trait
/// so a `FakeClock` can drive schedule math, rush-window transitions and
/// retry backoff deterministically.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for timer arithmetic.
    fn now(&self) -> Instant;

    /// Wall-clock time, used for `lastSyncTime`/`synctime` persistence and
    /// rush-window-of-day checks.
    fn now_utc(&self) -> SystemTime;
}

/// Production clock backed by the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_utc(&self) -> SystemTime {
        SystemTime::now()
    }
}

#[derive(Debug)]
struct FakeClockState {
    now: Instant,
    now_utc: SystemTime,
}

/// Test clock that only advances when told to.
#[derive(Clone)]
pub struct FakeClock {
    state: Arc<Mutex<FakeClockState>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeClockState {
                now: Instant::now(),
                now_utc: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            })),
        }
    }

    /// Advance both the monotonic and wall clocks by `d`.
    pub fn advance(&self, d: Duration) {
        let mut state = self.state.lock();
        state.now += d;
        state.now_utc += d;
    }

    /// Pin the wall clock to an explicit instant (seconds since epoch).
    pub fn set_utc_secs(&self, secs: u64) {
        let mut state = self.state.lock();
        state.now_utc = UNIX_EPOCH + Duration::from_secs(secs);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.state.lock().now
    }

    fn now_utc(&self) -> SystemTime {
        self.state.lock().now_utc
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
