//! Entity id allocation with recycling.
//!
//! The `IdentityAllocator` hands out numeric ids below a fixed cap and takes
//! destroyed ids back for reuse. It only knows which ids it has issued and
//! which have been returned; whether an entity is alive is tracked by the
//! owner of the allocator.

// Ids are bounded by `max_entities`, which the owner validates to fit in u32
#![allow(clippy::cast_possible_truncation)]

use strata_foundation::{EntityId, Error, Result};

/// Issues and recycles entity ids.
///
/// Ids are allocated from the recycle set when it is non-empty, otherwise
/// `next_id` is issued and advanced. Once `next_id` reaches `max_entities`
/// only recycled ids can be handed out.
#[derive(Debug, Clone)]
pub struct IdentityAllocator {
    /// Next never-issued id.
    next_id: usize,
    /// Upper bound (exclusive) on every id.
    max_entities: usize,
    /// Destroyed ids available for reuse, most recent last.
    recycled: Vec<EntityId>,
    /// Membership flags for `recycled`, indexed by id.
    is_recycled: Vec<bool>,
}

impl IdentityAllocator {
    /// Creates an allocator issuing ids in `0..max_entities`.
    #[must_use]
    pub fn new(max_entities: usize) -> Self {
        Self {
            next_id: 0,
            max_entities,
            recycled: Vec::new(),
            is_recycled: Vec::new(),
        }
    }

    /// Allocates an id, preferring a recycled one.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if every id below the cap is in use.
    pub fn allocate(&mut self) -> Result<EntityId> {
        if let Some(id) = self.recycled.pop() {
            self.is_recycled[id.index()] = false;
            return Ok(id);
        }

        if self.next_id >= self.max_entities {
            return Err(Error::capacity_exceeded(self.max_entities));
        }

        let id = EntityId::new(self.next_id as u32);
        self.next_id += 1;
        self.is_recycled.push(false);
        Ok(id)
    }

    /// Returns an id to the recycle set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEntity` if the id was never issued or is already
    /// waiting in the recycle set.
    pub fn free(&mut self, id: EntityId) -> Result<()> {
        if !self.is_issued(id) {
            return Err(Error::invalid_entity(id));
        }

        self.is_recycled[id.index()] = true;
        self.recycled.push(id);
        Ok(())
    }

    /// Returns true if `id` has been issued and not returned.
    #[must_use]
    pub fn is_issued(&self, id: EntityId) -> bool {
        id.index() < self.next_id && !self.is_recycled[id.index()]
    }

    /// Restarts allocation from zero, keeping allocated storage.
    pub fn reset(&mut self) {
        self.next_id = 0;
        self.recycled.clear();
        self.is_recycled.clear();
    }

    /// Returns the number of ids currently issued.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.next_id - self.recycled.len()
    }

    /// Returns the configured cap.
    #[must_use]
    pub fn max_entities(&self) -> usize {
        self.max_entities
    }

    /// Returns the next never-issued id value.
    #[must_use]
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    /// Returns the number of ids waiting for reuse.
    #[must_use]
    pub fn recycled_count(&self) -> usize {
        self.recycled.len()
    }
}
