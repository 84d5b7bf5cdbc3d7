// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn static_tracker_implements_trait_object_safely() {
    let tracker: Box<dyn ConnectivityTracker> =
        Box::new(StaticConnectivityTracker::always_online(InternetType::Ethernet));
    assert!(tracker.is_online());
}
