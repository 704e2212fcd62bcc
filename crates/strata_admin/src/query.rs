//! Lazy multi-pool entity queries.

use std::fmt;

use strata_foundation::EntityId;
use strata_storage::ErasedPool;

/// Iterator over entities present in every pool of a requirement set.
///
/// Walks the smallest pool in dense order and checks the others through
/// their sparse arrays. Built fresh on every call; holds a shared borrow of
/// the Admin, so membership cannot change while it runs.
pub struct Query<'a> {
    driver: Option<Box<dyn Iterator<Item = EntityId> + 'a>>,
    filters: Vec<&'a dyn ErasedPool>,
}

impl<'a> Query<'a> {
    /// Builds a query from pools sorted smallest first.
    pub(crate) fn new(mut pools: Vec<&'a dyn ErasedPool>) -> Self {
        if pools.is_empty() {
            return Self::empty();
        }
        let smallest = pools.remove(0);
        Self {
            driver: Some(smallest.entities()),
            filters: pools,
        }
    }

    /// A query matching nothing.
    pub(crate) fn empty() -> Self {
        Self {
            driver: None,
            filters: Vec::new(),
        }
    }
}

impl Iterator for Query<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        let driver = self.driver.as_mut()?;
        driver.find(|id| self.filters.iter().all(|pool| pool.contains_entity(*id)))
    }
}

impl fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field(
                "pools",
                &self
                    .filters
                    .iter()
                    .map(|pool| pool.component_type())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
