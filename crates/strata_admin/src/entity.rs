//! Read-only entity views.

use std::fmt;

use strata_foundation::{Component, ComponentType, EntityId};

use crate::admin::Admin;

/// A live entity together with the Admin that owns its components.
///
/// Views borrow the Admin, so they cannot outlive a tick's worth of
/// mutation: re-fetch them instead of holding on to them.
#[derive(Clone, Copy)]
pub struct EntityRef<'a> {
    admin: &'a Admin,
    id: EntityId,
}

impl<'a> EntityRef<'a> {
    pub(crate) fn new(admin: &'a Admin, id: EntityId) -> Self {
        Self { admin, id }
    }

    /// Returns the entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns true if the entity holds a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.admin
            .get_component_pool::<T>()
            .is_ok_and(|pool| pool.contains_entity(self.id))
    }

    /// Returns the entity's `T`, if it holds one.
    #[must_use]
    pub fn get_component<T: Component>(&self) -> Option<&'a T> {
        self.admin.get_component_pool::<T>().ok()?.get(self.id)
    }

    /// Returns the types of every component the entity holds, in pool
    /// registration order.
    #[must_use]
    pub fn component_types(&self) -> Vec<ComponentType> {
        self.admin
            .pools()
            .filter(|pool| pool.contains_entity(self.id))
            .map(|pool| pool.component_type())
            .collect()
    }
}

impl fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("id", &self.id)
            .field("components", &self.component_types())
            .finish()
    }
}
