//! Systems: stateless behavior that reads and writes through the Admin.
//!
//! A system declares the component types it needs and the event channels it
//! listens on. It never caches entities between calls; every
//! [`get_required_entities`](SystemExt::get_required_entities) call builds a
//! fresh query.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use strata_events::{Event, Handler};
use strata_foundation::{ComponentType, EntityId, Result, SingletonComponent};
use strata_storage::ErasedPool;

use crate::admin::Admin;
use crate::entity::EntityRef;
use crate::query::Query;

/// Behavior registered with an [`Admin`].
pub trait System: 'static {
    /// Name used in logs and error frames.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Component types an entity must hold to be processed by this system.
    fn required_components(&self) -> Vec<ComponentType>;

    /// Event handlers to wire when the system is registered.
    ///
    /// Called once by [`Admin::init_systems`]. Each subscription names a
    /// channel that must already be registered.
    fn subscribe_to_events(self: Rc<Self>) -> Vec<Subscription> {
        Vec::new()
    }
}

/// A handler a system wants attached to a channel.
pub struct Subscription {
    /// Channel name.
    pub channel: String,
    /// Handler invoked on each publish.
    pub handler: Handler<Admin>,
}

impl Subscription {
    /// Creates a subscription from a closure.
    pub fn new<F>(channel: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Admin, &Event<'_>) -> Result<()> + 'static,
    {
        Self {
            channel: channel.into(),
            handler: Rc::new(handler),
        }
    }

    /// Creates a subscription that calls `method` on `system`.
    pub fn method<S: System>(
        channel: impl Into<String>,
        system: &Rc<S>,
        method: fn(&S, &mut Admin, &Event<'_>) -> Result<()>,
    ) -> Self {
        let system = Rc::clone(system);
        Self::new(channel, move |admin, event| method(&system, admin, event))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// Admin access helpers available on every system.
pub trait SystemExt: System {
    /// Lazily iterates entities holding every required component.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType` if a required type has no pool.
    fn get_required_entities<'a>(&self, admin: &'a Admin) -> Result<Query<'a>> {
        admin.query(&self.required_components())
    }

    /// Returns the pools of the required components, smallest first.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType` if a required type has no pool.
    fn get_component_pools<'a>(&self, admin: &'a Admin) -> Result<Vec<&'a dyn ErasedPool>> {
        admin.get_component_pools(&self.required_components())
    }

    /// Publishes an event through the Admin.
    ///
    /// # Errors
    ///
    /// See [`Admin::publish_event`].
    fn publish_event(&self, admin: &mut Admin, name: &str, payload: &dyn Any) -> Result<()> {
        admin.publish_event(name, payload)
    }

    /// Returns a singleton from the Admin.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSingleton` if none was added.
    fn get_singleton_component<'a, T: SingletonComponent>(&self, admin: &'a Admin) -> Result<&'a T> {
        admin.get_singleton_component::<T>()
    }

    /// Returns a view of a live entity.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` if the entity is not alive.
    fn get_entity<'a>(&self, admin: &'a Admin, id: EntityId) -> Result<EntityRef<'a>> {
        admin.get_entity(id)
    }
}

impl<S: System + ?Sized> SystemExt for S {}
