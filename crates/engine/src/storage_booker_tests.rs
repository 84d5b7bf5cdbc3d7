// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::{BTreeSet, HashMap};

use syncd_core::StorageName;

use super::*;

fn set(names: &[&str]) -> BTreeSet<StorageName> {
    names.iter().map(|n| StorageName::new(*n)).collect()
}

#[test]
fn reserve_all_or_nothing_on_conflict() {
    let mut reservations = HashMap::new();
    assert!(reserve(&mut reservations, &set(&["hcontacts"]), "alice"));

    let ok = reserve(&mut reservations, &set(&["hcontacts", "hcalendar"]), "bob");
    assert!(!ok, "bob should not win hcontacts already held by alice");
    assert!(
        !reservations.contains_key("hcalendar"),
        "all-or-nothing: hcalendar must not be partially reserved"
    );
}

#[test]
fn reserve_same_owner_still_conflicts() {
    let mut reservations = HashMap::new();
    assert!(reserve(&mut reservations, &set(&["hcontacts"]), "alice"));
    assert!(!reserve(&mut reservations, &set(&["hcontacts"]), "alice"));
}

#[test]
fn release_then_reserve_succeeds() {
    let mut reservations = HashMap::new();
    reserve(&mut reservations, &set(&["hcontacts"]), "alice");
    release(&mut reservations, &set(&["hcontacts"]));
    assert!(reserve(&mut reservations, &set(&["hcontacts"]), "bob"));
}

#[test]
fn reserve_one_and_release_one() {
    let mut reservations = HashMap::new();
    assert!(reserve_one(&mut reservations, &StorageName::new("hcontacts"), "alice"));
    assert!(!reserve_one(&mut reservations, &StorageName::new("hcontacts"), "bob"));
    release_one(&mut reservations, &StorageName::new("hcontacts"));
    assert!(reserve_one(&mut reservations, &StorageName::new("hcontacts"), "bob"));
}

#[test]
fn conflicts_reports_held_subset() {
    let mut reservations = HashMap::new();
    reserve(&mut reservations, &set(&["hcontacts"]), "alice");
    let held = conflicts(&reservations, &set(&["hcontacts", "hcalendar"]));
    assert_eq!(held, vec![StorageName::new("hcontacts")]);
}
