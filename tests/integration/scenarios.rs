//! End-to-end scenarios
//!
//! The attach/query round trip and singleton isolation, driven through a
//! registered system.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strata::admin::{Admin, System, SystemExt};
use strata::foundation::{Component, ComponentType, Result, SerializedForm, SingletonComponent};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Health {
    value: i32,
}

impl Component for Health {
    fn serialize(&self) -> Result<SerializedForm> {
        SerializedForm::encode(self)
    }

    fn deserialize(data: &SerializedForm) -> Result<Self> {
        data.decode()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct InputState {
    key: String,
}

impl Component for InputState {
    fn serialize(&self) -> Result<SerializedForm> {
        SerializedForm::encode(self)
    }

    fn deserialize(data: &SerializedForm) -> Result<Self> {
        data.decode()
    }
}

impl SingletonComponent for InputState {}

struct Vitals;

impl System for Vitals {
    fn required_components(&self) -> Vec<ComponentType> {
        vec![ComponentType::of::<Health>()]
    }
}

#[test]
fn attach_query_round_trip() {
    let mut admin = Admin::default();
    admin.register_component::<Health>().unwrap();
    let vitals = Rc::new(Vitals);
    admin.init_systems(vec![vitals.clone()]).unwrap();

    let e1 = admin.create_entity().unwrap();
    admin
        .attach_component_to_entity(e1, |h: &mut Health| h.value = 100)
        .unwrap();

    let found: Vec<_> = vitals.get_required_entities(&admin).unwrap().collect();
    assert_eq!(found, vec![e1]);
    assert_eq!(admin.get_component::<Health>(e1).unwrap().unwrap().value, 100);

    admin.destroy_entity(e1).unwrap();
    assert_eq!(vitals.get_required_entities(&admin).unwrap().count(), 0);
}

#[test]
fn singleton_isolation() {
    let mut admin = Admin::default();
    admin.register_component::<Health>().unwrap();
    admin.add_singleton_component(InputState {
        key: "W".to_string(),
    });

    let expected = InputState {
        key: "W".to_string(),
    };
    assert_eq!(admin.get_singleton_component::<InputState>().unwrap(), &expected);

    let mut ids = Vec::new();
    for count in [1, 10, 100] {
        while ids.len() < count {
            let id = admin.create_entity().unwrap();
            admin.insert_component(id, Health::default()).unwrap();
            ids.push(id);
        }
        assert_eq!(Vitals.get_singleton_component::<InputState>(&admin).unwrap(), &expected);
    }

    for id in ids.drain(..) {
        admin.destroy_entity(id).unwrap();
    }
    assert_eq!(admin.get_singleton_component::<InputState>().unwrap(), &expected);
    assert!(admin.get_component_pool::<InputState>().is_err());
}

#[test]
fn singleton_survives_serialization() {
    let mut admin = Admin::default();
    admin.add_singleton_component(InputState {
        key: "W".to_string(),
    });

    let form = Component::serialize(admin.get_singleton_component::<InputState>().unwrap()).unwrap();
    let restored = <InputState as Component>::deserialize(&form).unwrap();

    let mut other = Admin::default();
    other.add_singleton_component(restored);
    assert_eq!(other.get_singleton_component::<InputState>().unwrap().key, "W");
}
