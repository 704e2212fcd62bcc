//! Construction parameters for an [`Admin`](crate::Admin).

use serde::{Deserialize, Serialize};
use strata_foundation::{Error, Result};

/// Default cap on simultaneously issued entity ids.
pub const DEFAULT_MAX_ENTITIES: usize = 1000;

/// Configuration for an Admin.
///
/// Sizes are fixed at construction; changing them means building a new
/// Admin. Every field has a default, so a partial document deserializes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Cap on simultaneously issued entity ids. Every id is below it.
    pub max_entities: usize,

    /// Sparse array length for pools created with
    /// [`Admin::register_component`](crate::Admin::register_component).
    /// Defaults to `max_entities`.
    pub entity_capacity: Option<usize>,

    /// Event channels registered at construction.
    pub events: Vec<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            entity_capacity: None,
            events: Vec::new(),
        }
    }
}

impl AdminConfig {
    /// Builder method to set the entity cap.
    #[must_use]
    pub fn with_max_entities(mut self, max_entities: usize) -> Self {
        self.max_entities = max_entities;
        self
    }

    /// Builder method to set the default pool capacity.
    #[must_use]
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = Some(capacity);
        self
    }

    /// Builder method to pre-register an event channel.
    #[must_use]
    pub fn with_event(mut self, name: impl Into<String>) -> Self {
        self.events.push(name.into());
        self
    }

    /// Returns the capacity used for default pools.
    #[must_use]
    pub fn entity_capacity(&self) -> usize {
        self.entity_capacity.unwrap_or(self.max_entities)
    }

    /// Checks the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `max_entities` is zero or does not fit an
    /// entity id, or if the pool capacity is below `max_entities`.
    pub fn validate(&self) -> Result<()> {
        if self.max_entities == 0 {
            return Err(Error::invalid_config("max_entities must be positive"));
        }
        if self.max_entities > u32::MAX as usize {
            return Err(Error::invalid_config(format!(
                "max_entities {} exceeds the entity id range",
                self.max_entities
            )));
        }
        if self.entity_capacity() < self.max_entities {
            return Err(Error::invalid_config(format!(
                "entity_capacity {} is below max_entities {}",
                self.entity_capacity(),
                self.max_entities
            )));
        }
        Ok(())
    }
}
