//! Frame loop integration tests
//!
//! A small simulation: input is stored as a singleton, a `tick` event
//! drives systems, and systems spawn and destroy entities mid-run.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strata::admin::{Admin, AdminConfig, Event, Subscription, System, SystemExt};
use strata::foundation::{Component, ComponentType, EntityId, Error, Result, SerializedForm, SingletonComponent};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Lifetime {
    frames: u32,
}

impl Component for Lifetime {
    fn serialize(&self) -> Result<SerializedForm> {
        SerializedForm::encode(self)
    }

    fn deserialize(data: &SerializedForm) -> Result<Self> {
        data.decode()
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct FrameCount {
    frames: u64,
    spawned: u64,
    expired: u64,
}

impl Component for FrameCount {
    fn serialize(&self) -> Result<SerializedForm> {
        SerializedForm::encode(self)
    }

    fn deserialize(data: &SerializedForm) -> Result<Self> {
        data.decode()
    }
}

impl SingletonComponent for FrameCount {}

/// Spawns one short-lived entity per tick.
struct Spawner;

impl Spawner {
    fn on_tick(&self, admin: &mut Admin, event: &Event<'_>) -> Result<()> {
        let frames = *event.payload::<u32>()?;
        admin.build_entity().with(Lifetime { frames }).build()?;
        admin.get_singleton_component_mut::<FrameCount>()?.spawned += 1;
        Ok(())
    }
}

impl System for Spawner {
    fn required_components(&self) -> Vec<ComponentType> {
        Vec::new()
    }

    fn subscribe_to_events(self: Rc<Self>) -> Vec<Subscription> {
        vec![Subscription::method("tick", &self, Self::on_tick)]
    }
}

/// Ages every entity with a Lifetime and destroys the expired ones.
struct Reaper;

impl Reaper {
    fn on_tick(&self, admin: &mut Admin, _event: &Event<'_>) -> Result<()> {
        let candidates: Vec<EntityId> = self.get_required_entities(admin)?.collect();
        let mut expired = Vec::new();
        for id in candidates {
            let lifetime = admin
                .get_component_mut::<Lifetime>(id)?
                .ok_or_else(|| Error::unknown_entity(id))?;
            lifetime.frames = lifetime.frames.saturating_sub(1);
            if lifetime.frames == 0 {
                expired.push(id);
            }
        }
        for id in &expired {
            admin.destroy_entity(*id)?;
        }
        if !expired.is_empty() {
            admin.publish_event("expired", &expired.len())?;
        }
        Ok(())
    }
}

impl System for Reaper {
    fn required_components(&self) -> Vec<ComponentType> {
        vec![ComponentType::of::<Lifetime>()]
    }

    fn subscribe_to_events(self: Rc<Self>) -> Vec<Subscription> {
        vec![Subscription::method("tick", &self, Self::on_tick)]
    }
}

fn world(max_entities: usize) -> Admin {
    let config = AdminConfig::default()
        .with_max_entities(max_entities)
        .with_event("tick")
        .with_event("expired");
    let mut admin = Admin::new(config).unwrap();
    admin.register_component::<Lifetime>().unwrap();
    admin.add_singleton_component(FrameCount::default());
    admin
        .subscribe("expired", |admin, event| {
            let count = *event.payload::<usize>()?;
            admin.get_singleton_component_mut::<FrameCount>()?.expired += count as u64;
            Ok(())
        })
        .unwrap();
    admin
        .subscribe("tick", |admin, _| {
            admin.get_singleton_component_mut::<FrameCount>()?.frames += 1;
            Ok(())
        })
        .unwrap();
    admin
        .init_systems(vec![Rc::new(Spawner), Rc::new(Reaper)])
        .unwrap();
    admin
}

#[test]
fn entities_cycle_through_a_bounded_world() {
    let mut admin = world(4);

    for _ in 0..100 {
        admin.publish_event("tick", &3u32).unwrap();
        assert!(admin.entity_count() <= 4);
    }

    let counts = admin.get_singleton_component::<FrameCount>().unwrap();
    assert_eq!(counts.frames, 100);
    assert_eq!(counts.spawned, 100);
    assert_eq!(counts.expired + admin.entity_count() as u64, 100);
    assert!(admin.entities().all(|id| id.index() < 4));
}

#[test]
fn every_live_entity_is_in_the_lifetime_pool() {
    let mut admin = world(8);
    for _ in 0..20 {
        admin.publish_event("tick", &5u32).unwrap();

        let live: Vec<_> = admin.entities().collect();
        let mut pooled: Vec<_> = admin
            .query(&[ComponentType::of::<Lifetime>()])
            .unwrap()
            .collect();
        pooled.sort();
        assert_eq!(live, pooled);
    }
}

#[test]
fn world_overflow_stops_the_tick() {
    let mut admin = world(2);

    admin.publish_event("tick", &10u32).unwrap();
    admin.publish_event("tick", &10u32).unwrap();
    let err = admin.publish_event("tick", &10u32).unwrap_err();

    assert!(matches!(err.kind, strata::foundation::ErrorKind::CapacityExceeded { max_entities: 2 }));
    assert_eq!(admin.entity_count(), 2);
    assert_eq!(admin.event_bus().subscriber_count("tick").unwrap(), 3);
}

#[test]
fn reset_starts_a_fresh_run() {
    let mut admin = world(4);
    for _ in 0..3 {
        admin.publish_event("tick", &10u32).unwrap();
    }
    admin.reset();

    assert_eq!(admin.entity_count(), 0);
    admin.publish_event("tick", &10u32).unwrap();
    assert_eq!(admin.entities().collect::<Vec<_>>(), vec![EntityId::new(0)]);
}
