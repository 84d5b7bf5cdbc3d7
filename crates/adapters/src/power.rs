// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Battery/power-save policy.
//!
//! Real battery and power-save-mode monitoring is out of scope for the same
//! reason transport probing is (see `connectivity`): it depends on
//! platform-specific services the orchestrator core only ever consumes
//! through a narrow query surface. This trait is that surface.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Current battery/power-save state, queried by the orchestrator at
/// dequeue/start time for a scheduled sync (§4.4, §7).
pub trait PowerPolicy: Send + Sync + 'static {
    /// True if the device is too low on battery to start a scheduled sync.
    fn is_low_battery(&self) -> bool;

    /// True if the device is in a power-saving mode that defers scheduled
    /// syncs.
    fn is_power_saving(&self) -> bool;
}

/// Fixed-state stub for production wiring that has no real power source
/// hooked up yet, or for manual-only deployments.
#[derive(Debug, Clone, Copy)]
pub struct StaticPowerPolicy {
    low_battery: bool,
    power_saving: bool,
}

impl StaticPowerPolicy {
    pub fn normal() -> Self {
        Self {
            low_battery: false,
            power_saving: false,
        }
    }

    pub fn low_battery() -> Self {
        Self {
            low_battery: true,
            power_saving: false,
        }
    }

    pub fn power_saving() -> Self {
        Self {
            low_battery: false,
            power_saving: true,
        }
    }
}

impl PowerPolicy for StaticPowerPolicy {
    fn is_low_battery(&self) -> bool {
        self.low_battery
    }

    fn is_power_saving(&self) -> bool {
        self.power_saving
    }
}

/// Mutable test double.
#[derive(Clone)]
pub struct FakePowerPolicy {
    low_battery: Arc<AtomicBool>,
    power_saving: Arc<Mutex<bool>>,
}

impl FakePowerPolicy {
    pub fn new() -> Self {
        Self {
            low_battery: Arc::new(AtomicBool::new(false)),
            power_saving: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_low_battery(&self, low: bool) {
        self.low_battery.store(low, Ordering::SeqCst);
    }

    pub fn set_power_saving(&self, saving: bool) {
        *self.power_saving.lock() = saving;
    }
}

impl Default for FakePowerPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerPolicy for FakePowerPolicy {
    fn is_low_battery(&self) -> bool {
        self.low_battery.load(Ordering::SeqCst)
    }

    fn is_power_saving(&self) -> bool {
        *self.power_saving.lock()
    }
}

#[cfg(test)]
#[path = "power_tests.rs"]
mod tests;
