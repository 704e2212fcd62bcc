//! Integration tests for singleton components
//!
//! Tests that singletons live outside every entity and pool.

use strata_foundation::ErrorKind;

use crate::{Health, InputState, admin};

#[test]
fn singleton_is_readable_without_entities() {
    let mut admin = admin(8);
    admin.add_singleton_component(InputState {
        key: "W".to_string(),
    });

    assert_eq!(admin.entity_count(), 0);
    assert_eq!(admin.get_singleton_component::<InputState>().unwrap().key, "W");
}

#[test]
fn singleton_is_unaffected_by_entity_churn() {
    let mut admin = admin(8);
    admin.add_singleton_component(InputState {
        key: "W".to_string(),
    });

    for _ in 0..3 {
        let ids: Vec<_> = (0..8).map(|_| admin.create_entity().unwrap()).collect();
        for id in &ids {
            admin.insert_component(*id, Health::default()).unwrap();
        }
        assert_eq!(admin.get_singleton_component::<InputState>().unwrap().key, "W");
        for id in ids {
            admin.destroy_entity(id).unwrap();
        }
    }

    admin.reset();
    assert_eq!(admin.get_singleton_component::<InputState>().unwrap().key, "W");
}

#[test]
fn missing_singleton_is_an_error() {
    let admin = admin(8);
    let err = admin.get_singleton_component::<InputState>().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownSingleton(_)));
    assert!(!admin.has_singleton_component::<InputState>());
}

#[test]
fn adding_again_replaces() {
    let mut admin = admin(8);
    admin.add_singleton_component(InputState {
        key: "W".to_string(),
    });
    admin.get_singleton_component_mut::<InputState>().unwrap().key = "A".to_string();

    let previous = admin
        .add_singleton_component(InputState {
            key: "D".to_string(),
        })
        .unwrap();

    assert_eq!(previous.key, "A");
    assert_eq!(admin.get_singleton_component::<InputState>().unwrap().key, "D");
}
