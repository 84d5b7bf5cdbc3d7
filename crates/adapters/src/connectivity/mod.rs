// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport connectivity tracking.
//!
//! Real transport probing (NetworkManager/USB/BlueZ D-Bus signals, per the
//! original transport tracker) is out of scope; the daemon listener is
//! expected to translate whatever host signal is available into
//! `ConnectivityTracker::set_online` calls, or into `ConnectivityChanged`
//! events directly. This trait exists so the sync-on-change/scheduler
//! layers can query current state without depending on a concrete source.

mod noop;

pub use noop::StaticConnectivityTracker;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeConnectivityTracker;

use syncd_core::InternetType;

/// Current transport state, queried by the orchestrator when deciding
/// whether a waiting-for-online session can proceed.
pub trait ConnectivityTracker: Send + Sync + 'static {
    /// Whether any usable transport is currently up.
    fn is_online(&self) -> bool;

    /// The transport class currently in use, if online.
    fn internet_type(&self) -> InternetType;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
