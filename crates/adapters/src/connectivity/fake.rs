// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutable connectivity tracker for tests: lets a test flip online state
//! without wiring a real transport signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use syncd_core::InternetType;

use super::ConnectivityTracker;

#[derive(Clone)]
pub struct FakeConnectivityTracker {
    online: Arc<AtomicBool>,
    internet_type: Arc<Mutex<InternetType>>,
}

impl FakeConnectivityTracker {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
            internet_type: Arc::new(Mutex::new(InternetType::Wifi)),
        }
    }

    pub fn set_online(&self, online: bool, internet_type: InternetType) {
        self.online.store(online, Ordering::SeqCst);
        *self.internet_type.lock() = internet_type;
    }
}

impl ConnectivityTracker for FakeConnectivityTracker {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn internet_type(&self) -> InternetType {
        *self.internet_type.lock()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
