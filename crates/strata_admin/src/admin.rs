//! The Admin: sole owner of pools, entities, singletons, events, and systems.
//!
//! Everything application code and systems do goes through the Admin. It
//! is the only part of the runtime that knows the full set of pools, so it
//! is responsible for clearing a destroyed entity out of every one of them
//! before its id can be reissued.

// Entity ids are bounded by max_entities, which the config keeps within u32
#![allow(clippy::cast_possible_truncation)]

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use strata_events::{Event, EventBus, Handler};
use strata_foundation::{Component, ComponentType, EntityId, Error, Result, SingletonComponent};
use strata_storage::{ComponentPool, ErasedPool, IdentityAllocator};
use tracing::debug;

use crate::builder::EntityBuilder;
use crate::config::AdminConfig;
use crate::entity::EntityRef;
use crate::query::Query;
use crate::system::System;

/// Owning coordinator of an ECS session.
pub struct Admin {
    config: AdminConfig,
    allocator: IdentityAllocator,
    /// Liveness by entity index.
    alive: Vec<bool>,
    /// Pools in registration order.
    pools: Vec<Box<dyn ErasedPool>>,
    /// Component type -> index into `pools`.
    pool_index: HashMap<TypeId, usize>,
    singletons: HashMap<TypeId, Box<dyn Any>>,
    event_bus: EventBus<Admin>,
    systems: Vec<Rc<dyn System>>,
    systems_initialized: bool,
}

impl Admin {
    /// Creates an Admin, registering the configured event channels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration is unusable, or
    /// `DuplicateChannel` if it names a channel twice.
    pub fn new(config: AdminConfig) -> Result<Self> {
        config.validate()?;

        let events = config.events.clone();
        let mut admin = Self::with_validated(config);
        for name in events {
            admin.event_bus.register_event(name)?;
        }
        Ok(admin)
    }

    fn with_validated(config: AdminConfig) -> Self {
        debug!(max_entities = config.max_entities, "admin created");
        Self {
            allocator: IdentityAllocator::new(config.max_entities),
            alive: vec![false; config.max_entities],
            pools: Vec::new(),
            pool_index: HashMap::new(),
            singletons: HashMap::new(),
            event_bus: EventBus::new(),
            systems: Vec::new(),
            systems_initialized: false,
            config,
        }
    }

    /// Creates an Admin with default settings and the given entity cap.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `max_entities` is zero.
    pub fn with_max_entities(max_entities: usize) -> Result<Self> {
        Self::new(AdminConfig::default().with_max_entities(max_entities))
    }

    /// Returns the configuration this Admin was built with.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    // --- Entities ---

    /// Creates a new entity.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if every id is in use.
    pub fn create_entity(&mut self) -> Result<EntityId> {
        let id = self.allocator.allocate()?;
        self.alive[id.index()] = true;
        debug!(entity = %id, "entity created");
        Ok(id)
    }

    /// Starts building an entity with a set of components.
    pub fn build_entity(&mut self) -> EntityBuilder<'_> {
        EntityBuilder::new(self)
    }

    /// Destroys an entity, removing it from every pool and recycling its id.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` if the entity is not alive.
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<()> {
        self.ensure_alive(id)?;

        for pool in &mut self.pools {
            pool.remove_entity(id);
        }
        self.alive[id.index()] = false;
        self.allocator.free(id)?;

        debug!(entity = %id, "entity destroyed");
        Ok(())
    }

    /// Returns true if `id` names a live entity.
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.alive.get(id.index()).copied().unwrap_or(false)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.allocator.live_count()
    }

    /// Iterates live entity ids in ascending order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(index, _)| EntityId::new(index as u32))
    }

    /// Returns a read-only view of a live entity.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` if the entity is not alive.
    pub fn get_entity(&self, id: EntityId) -> Result<EntityRef<'_>> {
        self.ensure_alive(id)?;
        Ok(EntityRef::new(self, id))
    }

    // --- Pools ---

    /// Creates the pool for component type `T`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateComponentType` if the pool already exists, or
    /// `InvalidConfig` if `capacity` is below `max_entities`.
    pub fn create_component_pool<T: Component>(
        &mut self,
        capacity: usize,
    ) -> Result<&mut ComponentPool<T>> {
        let type_id = TypeId::of::<T>();
        if self.pool_index.contains_key(&type_id) {
            return Err(Error::duplicate_component_type(T::type_name()));
        }
        if capacity < self.config.max_entities {
            return Err(Error::invalid_config(format!(
                "pool capacity {capacity} for {} is below max_entities {}",
                T::type_name(),
                self.config.max_entities
            )));
        }

        debug!(component = T::type_name(), capacity, "component pool created");
        self.pool_index.insert(type_id, self.pools.len());
        self.pools.push(Box::new(ComponentPool::<T>::new(capacity)));
        self.get_component_pool_mut::<T>()
    }

    /// Creates the pool for `T` with the configured entity capacity.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateComponentType` if the pool already exists.
    pub fn register_component<T: Component>(&mut self) -> Result<&mut ComponentPool<T>> {
        self.create_component_pool::<T>(self.config.entity_capacity())
    }

    /// Returns the pool for `T`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType` if no pool exists for `T`.
    pub fn get_component_pool<T: Component>(&self) -> Result<&ComponentPool<T>> {
        self.get_erased_pool(ComponentType::of::<T>())?
            .as_any()
            .downcast_ref::<ComponentPool<T>>()
            .ok_or_else(|| Error::unknown_component_type(T::type_name()))
    }

    /// Returns the pool for `T` mutably.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType` if no pool exists for `T`.
    pub fn get_component_pool_mut<T: Component>(&mut self) -> Result<&mut ComponentPool<T>> {
        let index = self.pool_slot(ComponentType::of::<T>())?;
        self.pools[index]
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
            .ok_or_else(|| Error::unknown_component_type(T::type_name()))
    }

    /// Returns the type-erased pool for a component type.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType` if no pool exists for the type.
    pub fn get_erased_pool(&self, component: ComponentType) -> Result<&dyn ErasedPool> {
        let index = self.pool_slot(component)?;
        Ok(&*self.pools[index])
    }

    /// Returns the pools for `components`, smallest first.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType` for the first type without a pool.
    pub fn get_component_pools(&self, components: &[ComponentType]) -> Result<Vec<&dyn ErasedPool>> {
        let mut pools = components
            .iter()
            .map(|component| self.get_erased_pool(*component))
            .collect::<Result<Vec<_>>>()?;
        pools.sort_by_key(|pool| pool.len());
        Ok(pools)
    }

    /// Iterates every registered pool in registration order.
    pub fn pools(&self) -> impl Iterator<Item = &dyn ErasedPool> + '_ {
        self.pools.iter().map(|pool| &**pool)
    }

    // --- Components ---

    /// Attaches a `T` to an entity, or returns the one it already holds.
    ///
    /// A new component is default-constructed and passed to `init` to apply
    /// field overrides. An existing component is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` if the entity is not alive, or
    /// `UnknownComponentType` if no pool exists for `T`.
    pub fn attach_component_to_entity<T, F>(&mut self, id: EntityId, init: F) -> Result<&mut T>
    where
        T: Component + Default,
        F: FnOnce(&mut T),
    {
        self.ensure_alive(id)?;
        self.get_component_pool_mut::<T>()?
            .get_or_create_component_obj(id, init)
    }

    /// Stores `value` on an entity, replacing any existing `T`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` if the entity is not alive, or
    /// `UnknownComponentType` if no pool exists for `T`.
    pub fn insert_component<T: Component>(&mut self, id: EntityId, value: T) -> Result<&mut T> {
        self.ensure_alive(id)?;
        self.get_component_pool_mut::<T>()?.set(id, value)
    }

    /// Detaches a `T` from an entity, returning it. Absent is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` if the entity is not alive, or
    /// `UnknownComponentType` if no pool exists for `T`.
    pub fn release_component<T: Component>(&mut self, id: EntityId) -> Result<Option<T>> {
        self.ensure_alive(id)?;
        Ok(self.get_component_pool_mut::<T>()?.release_component(id))
    }

    /// Gets an entity's `T`, if it holds one.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` if the entity is not alive, or
    /// `UnknownComponentType` if no pool exists for `T`.
    pub fn get_component<T: Component>(&self, id: EntityId) -> Result<Option<&T>> {
        self.ensure_alive(id)?;
        Ok(self.get_component_pool::<T>()?.get(id))
    }

    /// Gets an entity's `T` mutably, if it holds one.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` if the entity is not alive, or
    /// `UnknownComponentType` if no pool exists for `T`.
    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Result<Option<&mut T>> {
        self.ensure_alive(id)?;
        Ok(self.get_component_pool_mut::<T>()?.get_mut(id))
    }

    /// Lazily iterates live entities holding every type in `required`.
    ///
    /// The smallest pool drives iteration and the rest are checked by
    /// membership, so the cost follows the rarest component. An empty requirement matches
    /// nothing. Results are never cached.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType` if any required type has no pool.
    pub fn query<'a>(&'a self, required: &[ComponentType]) -> Result<Query<'a>> {
        if required.is_empty() {
            return Ok(Query::empty());
        }
        Ok(Query::new(self.get_component_pools(required)?))
    }

    // --- Singletons ---

    /// Stores a singleton, returning the one it replaces.
    pub fn add_singleton_component<T: SingletonComponent>(&mut self, instance: T) -> Option<T> {
        debug!(singleton = T::type_name(), "singleton added");
        self.singletons
            .insert(TypeId::of::<T>(), Box::new(instance))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    /// Returns the singleton of type `T`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSingleton` if none was added.
    pub fn get_singleton_component<T: SingletonComponent>(&self) -> Result<&T> {
        self.singletons
            .get(&TypeId::of::<T>())
            .and_then(|singleton| singleton.downcast_ref::<T>())
            .ok_or_else(|| Error::unknown_singleton(T::type_name()))
    }

    /// Returns the singleton of type `T` mutably.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSingleton` if none was added.
    pub fn get_singleton_component_mut<T: SingletonComponent>(&mut self) -> Result<&mut T> {
        self.singletons
            .get_mut(&TypeId::of::<T>())
            .and_then(|singleton| singleton.downcast_mut::<T>())
            .ok_or_else(|| Error::unknown_singleton(T::type_name()))
    }

    /// Returns true if a singleton of type `T` was added.
    #[must_use]
    pub fn has_singleton_component<T: SingletonComponent>(&self) -> bool {
        self.singletons.contains_key(&TypeId::of::<T>())
    }

    // --- Events ---

    /// Registers an event channel.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateChannel` if the channel exists.
    pub fn register_event(&mut self, name: impl Into<String>) -> Result<()> {
        self.event_bus.register_event(name)
    }

    /// Subscribes a handler to a channel.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChannel` if the channel was never registered.
    pub fn subscribe<F>(&mut self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut Admin, &Event<'_>) -> Result<()> + 'static,
    {
        self.event_bus.subscribe(name, handler)
    }

    /// Publishes `payload` on a channel, handing each subscriber this Admin.
    ///
    /// Subscribers run in subscription order against the list as it stood
    /// when this publish started. The first failure stops delivery and is
    /// returned. A subscriber may publish again on any channel, including
    /// the one being delivered.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChannel` or the first subscriber error.
    pub fn publish_event(&mut self, name: &str, payload: &dyn Any) -> Result<()> {
        EventBus::publish_in(self, Admin::event_bus, name, payload)
    }

    /// Returns the event bus.
    #[must_use]
    pub fn event_bus(&self) -> &EventBus<Admin> {
        &self.event_bus
    }

    // --- Systems ---

    /// Registers systems and wires their event subscriptions.
    ///
    /// Every subscription is checked before any is wired, so a failure
    /// leaves the bus untouched. May only succeed once per Admin.
    ///
    /// # Errors
    ///
    /// Returns `SystemsAlreadyInitialized` on a second call, or
    /// `UnknownChannel` if a system subscribes to an unregistered channel.
    pub fn init_systems(&mut self, systems: Vec<Rc<dyn System>>) -> Result<()> {
        if self.systems_initialized {
            return Err(Error::systems_already_initialized());
        }

        let mut wiring: Vec<(String, Handler<Admin>)> = Vec::new();
        for system in &systems {
            for subscription in Rc::clone(system).subscribe_to_events() {
                if !self.event_bus.is_registered(&subscription.channel) {
                    return Err(Error::unknown_channel(subscription.channel)
                        .with_frame(format!("system {}", system.name())));
                }
                wiring.push((subscription.channel, subscription.handler));
            }
        }

        for (channel, handler) in wiring {
            self.event_bus.subscribe_handler(&channel, handler)?;
        }
        for system in &systems {
            debug!(system = system.name(), "system registered");
        }
        self.systems = systems;
        self.systems_initialized = true;
        Ok(())
    }

    /// Returns the registered systems in registration order.
    #[must_use]
    pub fn systems(&self) -> &[Rc<dyn System>] {
        &self.systems
    }

    // --- Session ---

    /// Destroys every entity and restarts id allocation.
    ///
    /// Pools, singletons, channels, and systems stay registered.
    pub fn reset(&mut self) {
        for pool in &mut self.pools {
            pool.clear();
        }
        self.alive.fill(false);
        self.allocator.reset();
        debug!("admin reset");
    }

    // --- Private helpers ---

    fn ensure_alive(&self, id: EntityId) -> Result<()> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(Error::unknown_entity(id))
        }
    }

    fn pool_slot(&self, component: ComponentType) -> Result<usize> {
        self.pool_index
            .get(&component.id())
            .copied()
            .ok_or_else(|| Error::unknown_component_type(component.name()))
    }
}

impl Default for Admin {
    fn default() -> Self {
        Self::with_validated(AdminConfig::default())
    }
}

impl fmt::Debug for Admin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Admin")
            .field("config", &self.config)
            .field("entities", &self.entity_count())
            .field(
                "pools",
                &self
                    .pools
                    .iter()
                    .map(|pool| pool.component_type())
                    .collect::<Vec<_>>(),
            )
            .field("singletons", &self.singletons.len())
            .field("event_bus", &self.event_bus)
            .field(
                "systems",
                &self.systems.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
