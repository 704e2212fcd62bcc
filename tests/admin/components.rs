//! Integration tests for component attachment and queries
//!
//! Tests pools, attach/release, lookups, and multi-pool queries.

use strata_admin::{Admin, AdminConfig};
use strata_foundation::{ComponentType, ErrorKind};

use crate::{Health, Position, admin};

// =============================================================================
// Pools
// =============================================================================

#[test]
fn pools_are_registered_once() {
    let mut admin = admin(8);
    let err = admin.register_component::<Health>().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateComponentType(_)));
    assert_eq!(admin.pools().count(), 2);
}

#[test]
fn pool_capacity_follows_config() {
    let config = AdminConfig::default()
        .with_max_entities(8)
        .with_entity_capacity(32);
    let mut admin = Admin::new(config).unwrap();
    admin.register_component::<Health>().unwrap();

    assert_eq!(admin.get_component_pool::<Health>().unwrap().capacity(), 32);
}

#[test]
fn erased_pool_lookup_by_type() {
    let admin = admin(8);
    let pool = admin.get_erased_pool(ComponentType::of::<Position>()).unwrap();
    assert_eq!(pool.component_type(), ComponentType::of::<Position>());
}

// =============================================================================
// Attach and Release
// =============================================================================

#[test]
fn attach_with_overrides() {
    let mut admin = admin(8);
    let a = admin.create_entity().unwrap();

    admin
        .attach_component_to_entity(a, |p: &mut Position| {
            p.x = 3;
            p.y = 4;
        })
        .unwrap();

    assert_eq!(
        admin.get_component::<Position>(a).unwrap(),
        Some(&Position { x: 3, y: 4 })
    );
}

#[test]
fn attach_existing_returns_current_value() {
    let mut admin = admin(8);
    let a = admin.create_entity().unwrap();
    admin.insert_component(a, Health { value: 9 }).unwrap();

    let health = admin
        .attach_component_to_entity(a, |h: &mut Health| h.value = 0)
        .unwrap();
    assert_eq!(health.value, 9);
}

#[test]
fn release_twice_matches_release_once() {
    let mut admin = admin(8);
    let a = admin.create_entity().unwrap();
    let b = admin.create_entity().unwrap();
    admin.insert_component(a, Health { value: 1 }).unwrap();
    admin.insert_component(b, Health { value: 2 }).unwrap();

    admin.release_component::<Health>(a).unwrap();
    let once: Vec<_> = admin.query(&[ComponentType::of::<Health>()]).unwrap().collect();
    admin.release_component::<Health>(a).unwrap();
    let twice: Vec<_> = admin.query(&[ComponentType::of::<Health>()]).unwrap().collect();

    assert_eq!(once, twice);
    assert_eq!(once, vec![b]);
}

#[test]
fn mutate_through_get_component_mut() {
    let mut admin = admin(8);
    let a = admin.create_entity().unwrap();
    admin.insert_component(a, Health { value: 10 }).unwrap();

    if let Some(health) = admin.get_component_mut::<Health>(a).unwrap() {
        health.value -= 3;
    }
    assert_eq!(admin.get_component::<Health>(a).unwrap().unwrap().value, 7);
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn query_returns_only_entities_with_all_components() {
    let mut admin = admin(16);
    let mut expected = Vec::new();
    for i in 0..12 {
        let id = admin.create_entity().unwrap();
        if i % 2 == 0 {
            admin.insert_component(id, Health::default()).unwrap();
        }
        if i % 3 == 0 {
            admin.insert_component(id, Position::default()).unwrap();
        }
        if i % 6 == 0 {
            expected.push(id);
        }
    }

    let mut found: Vec<_> = admin
        .query(&[ComponentType::of::<Health>(), ComponentType::of::<Position>()])
        .unwrap()
        .collect();
    found.sort();
    assert_eq!(found, expected);
}

#[test]
fn query_is_not_cached() {
    let mut admin = admin(8);
    let health = [ComponentType::of::<Health>()];
    assert_eq!(admin.query(&health).unwrap().count(), 0);

    let a = admin.create_entity().unwrap();
    admin.insert_component(a, Health::default()).unwrap();
    assert_eq!(admin.query(&health).unwrap().collect::<Vec<_>>(), vec![a]);
}

#[test]
fn query_with_missing_pool_fails() {
    let admin = Admin::with_max_entities(8).unwrap();
    let err = admin.query(&[ComponentType::of::<Health>()]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownComponentType(_)));
}

#[test]
fn empty_query_matches_nothing() {
    let mut admin = admin(8);
    admin.create_entity().unwrap();
    assert_eq!(admin.query(&[]).unwrap().count(), 0);
}
