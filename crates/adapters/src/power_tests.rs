// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn static_normal_reports_both_false() {
    let policy = StaticPowerPolicy::normal();
    assert!(!policy.is_low_battery());
    assert!(!policy.is_power_saving());
}

#[test]
fn static_low_battery_reports_only_that() {
    let policy = StaticPowerPolicy::low_battery();
    assert!(policy.is_low_battery());
    assert!(!policy.is_power_saving());
}

#[test]
fn fake_reflects_latest_set_call() {
    let policy = FakePowerPolicy::new();
    assert!(!policy.is_low_battery());
    policy.set_low_battery(true);
    assert!(policy.is_low_battery());
    policy.set_power_saving(true);
    assert!(policy.is_power_saving());
}
