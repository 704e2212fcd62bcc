//! Fluent entity construction.

use std::fmt;

use strata_foundation::{Component, EntityId, Result};
use tracing::debug;

use crate::admin::Admin;

type Attachment = Box<dyn FnOnce(&mut Admin, EntityId) -> Result<()>>;

/// Collects components and creates an entity holding all of them.
///
/// Nothing touches the Admin until [`build`](Self::build). If any component
/// fails to attach, the half-built entity is destroyed and its id recycled.
///
/// ```ignore
/// let player = admin
///     .build_entity()
///     .with(Position { x: 0.0, y: 0.0 })
///     .with_fields(|h: &mut Health| h.value = 100)
///     .build()?;
/// ```
#[must_use = "an entity is only created when build() is called"]
pub struct EntityBuilder<'a> {
    admin: &'a mut Admin,
    attachments: Vec<(&'static str, Attachment)>,
}

impl<'a> EntityBuilder<'a> {
    pub(crate) fn new(admin: &'a mut Admin) -> Self {
        Self {
            admin,
            attachments: Vec::new(),
        }
    }

    /// Adds a component value, replacing any earlier `T` in this builder.
    pub fn with<T: Component>(mut self, component: T) -> Self {
        self.attachments.push((
            T::type_name(),
            Box::new(move |admin, id| admin.insert_component(id, component).map(|_| ())),
        ));
        self
    }

    /// Adds a default `T` with field overrides applied by `init`.
    pub fn with_fields<T, F>(mut self, init: F) -> Self
    where
        T: Component + Default,
        F: FnOnce(&mut T) + 'static,
    {
        self.attachments.push((
            T::type_name(),
            Box::new(move |admin, id| {
                let mut component = T::default();
                init(&mut component);
                admin.insert_component(id, component).map(|_| ())
            }),
        ));
        self
    }

    /// Creates the entity and attaches every component in order.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if no id is available, or the first
    /// attachment failure (typically `UnknownComponentType`).
    pub fn build(self) -> Result<EntityId> {
        let id = self.admin.create_entity()?;
        for (name, attach) in self.attachments {
            if let Err(err) = attach(self.admin, id) {
                self.admin.destroy_entity(id)?;
                debug!(entity = %id, component = name, "entity build rolled back");
                return Err(err.with_frame(format!("building {id} with {name}")));
            }
        }
        Ok(id)
    }
}

impl fmt::Debug for EntityBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityBuilder")
            .field(
                "components",
                &self
                    .attachments
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
