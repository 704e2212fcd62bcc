//! Sparse-set component storage.
//!
//! One `ComponentPool<T>` exists per component type. The sparse array maps
//! an entity id to a dense slot; the dense array holds `(EntityId, T)` pairs.
//! Removing a component tombstones its slot and pushes it onto a free-list,
//! so no other entry ever moves and the sparse index stays valid for every
//! entity that still holds the component.

use std::any::Any;

use strata_foundation::{Component, ComponentType, EntityId, Error, Result};
use tracing::trace;

/// Sparse array marker for "entity holds no component here".
const ABSENT: usize = usize::MAX;

/// Storage for every instance of one component type.
#[derive(Debug, Clone)]
pub struct ComponentPool<T> {
    /// Entity id -> dense slot, `ABSENT` when the entity holds no component.
    sparse: Vec<usize>,
    /// Live entries; `None` marks a released slot waiting on the free-list.
    dense: Vec<Option<(EntityId, T)>>,
    /// Released slots, reused most recent first.
    free_slots: Vec<usize>,
    /// Number of live entries.
    len: usize,
}

impl<T: Component> ComponentPool<T> {
    /// Creates a pool accepting entity ids in `0..entity_capacity`.
    #[must_use]
    pub fn new(entity_capacity: usize) -> Self {
        Self {
            sparse: vec![ABSENT; entity_capacity],
            dense: Vec::new(),
            free_slots: Vec::new(),
            len: 0,
        }
    }

    /// Returns the component type this pool stores.
    #[must_use]
    pub fn component_type(&self) -> ComponentType {
        ComponentType::of::<T>()
    }

    /// Adds a default-constructed component for `id`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `id` exceeds the capacity, or
    /// `DuplicateEntity` if `id` already holds this component.
    pub fn add_entity(&mut self, id: EntityId) -> Result<&mut T>
    where
        T: Default,
    {
        self.insert(id, T::default())
    }

    /// Adds `value` as the component for `id`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `id` exceeds the capacity, or
    /// `DuplicateEntity` if `id` already holds this component.
    pub fn insert(&mut self, id: EntityId, value: T) -> Result<&mut T> {
        self.check_range(id)?;
        if self.contains_entity(id) {
            return Err(Error::duplicate_entity(id));
        }

        let slot = if let Some(slot) = self.free_slots.pop() {
            slot
        } else {
            self.dense.push(None);
            self.dense.len() - 1
        };

        trace!(entity = %id, slot, component = T::type_name(), "component added");
        self.sparse[id.index()] = slot;
        self.len += 1;
        let (_, value) = self.dense[slot].insert((id, value));
        Ok(value)
    }

    /// Stores `value` for `id`, replacing any existing component.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `id` exceeds the capacity.
    pub fn set(&mut self, id: EntityId, value: T) -> Result<&mut T> {
        self.release_component(id);
        self.insert(id, value)
    }

    /// Returns true if `id` currently holds this component.
    #[must_use]
    pub fn contains_entity(&self, id: EntityId) -> bool {
        let Some(&slot) = self.sparse.get(id.index()) else {
            return false;
        };
        if slot == ABSENT {
            return false;
        }
        matches!(self.dense.get(slot), Some(Some((owner, _))) if *owner == id)
    }

    /// Returns the component for `id`, creating it if absent.
    ///
    /// An existing component is returned untouched. A new component is
    /// default-constructed and then handed to `init` so the caller can apply
    /// field overrides.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `id` exceeds the capacity.
    pub fn get_or_create_component_obj<F>(&mut self, id: EntityId, init: F) -> Result<&mut T>
    where
        T: Default,
        F: FnOnce(&mut T),
    {
        if self.contains_entity(id) {
            let slot = self.sparse[id.index()];
            return self.dense[slot]
                .as_mut()
                .map(|(_, value)| value)
                .ok_or_else(|| Error::unknown_entity(id));
        }

        let value = self.add_entity(id)?;
        init(&mut *value);
        Ok(value)
    }

    /// Removes the component for `id`, returning it.
    ///
    /// Releasing an entity that holds no component is a no-op.
    pub fn release_component(&mut self, id: EntityId) -> Option<T> {
        if !self.contains_entity(id) {
            return None;
        }

        let slot = std::mem::replace(&mut self.sparse[id.index()], ABSENT);
        let (_, value) = self.dense[slot].take()?;
        self.free_slots.push(slot);
        self.len -= 1;
        trace!(entity = %id, slot, component = T::type_name(), "component released");
        Some(value)
    }

    /// Removes `id` from the pool. Idempotent, like
    /// [`release_component`](Self::release_component).
    pub fn remove_entity(&mut self, id: EntityId) {
        self.release_component(id);
    }

    /// Gets the component for `id`.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        let slot = *self.sparse.get(id.index())?;
        match self.dense.get(slot)? {
            Some((owner, value)) if *owner == id => Some(value),
            _ => None,
        }
    }

    /// Gets the component for `id` mutably.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        let slot = *self.sparse.get(id.index())?;
        match self.dense.get_mut(slot)? {
            Some((owner, value)) if *owner == id => Some(value),
            _ => None,
        }
    }

    /// Returns the number of entities holding this component.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no entity holds this component.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the entity capacity (length of the sparse array).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.sparse.len()
    }

    /// Returns the number of released slots waiting for reuse.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.free_slots.len()
    }

    /// Iterates entities holding this component, in dense order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.dense
            .iter()
            .filter_map(|entry| entry.as_ref().map(|(id, _)| *id))
    }

    /// Iterates `(entity, component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.dense
            .iter()
            .filter_map(|entry| entry.as_ref().map(|(id, value)| (*id, value)))
    }

    /// Iterates `(entity, component)` pairs mutably in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.dense
            .iter_mut()
            .filter_map(|entry| entry.as_mut().map(|(id, value)| (*id, value)))
    }

    /// Removes every component, keeping the sparse array allocated.
    pub fn clear(&mut self) {
        for (id, _) in self.dense.iter().flatten() {
            self.sparse[id.index()] = ABSENT;
        }
        self.dense.clear();
        self.free_slots.clear();
        self.len = 0;
    }

    fn check_range(&self, id: EntityId) -> Result<()> {
        if id.index() >= self.sparse.len() {
            return Err(Error::out_of_range(id, self.sparse.len()));
        }
        Ok(())
    }
}

/// Type-erased view of a [`ComponentPool`].
///
/// Lets an owner holding pools of many component types clean up or query
/// entity membership without knowing the concrete component type.
pub trait ErasedPool: Any {
    /// Returns the component type of the underlying pool.
    fn component_type(&self) -> ComponentType;

    /// Returns true if `id` holds a component in this pool.
    fn contains_entity(&self, id: EntityId) -> bool;

    /// Removes `id` from this pool if present.
    fn remove_entity(&mut self, id: EntityId);

    /// Returns the number of live entries.
    fn len(&self) -> usize;

    /// Returns true if the pool holds nothing.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the entity capacity.
    fn capacity(&self) -> usize;

    /// Iterates entities holding this component, in dense order.
    fn entities(&self) -> Box<dyn Iterator<Item = EntityId> + '_>;

    /// Removes every entry.
    fn clear(&mut self);

    /// Upcasts for downcasting to the concrete pool.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts mutably for downcasting to the concrete pool.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedPool for ComponentPool<T> {
    fn component_type(&self) -> ComponentType {
        ComponentPool::component_type(self)
    }

    fn contains_entity(&self, id: EntityId) -> bool {
        ComponentPool::contains_entity(self, id)
    }

    fn remove_entity(&mut self, id: EntityId) {
        ComponentPool::remove_entity(self, id);
    }

    fn len(&self) -> usize {
        ComponentPool::len(self)
    }

    fn capacity(&self) -> usize {
        ComponentPool::capacity(self)
    }

    fn entities(&self) -> Box<dyn Iterator<Item = EntityId> + '_> {
        Box::new(ComponentPool::entities(self))
    }

    fn clear(&mut self) {
        ComponentPool::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
