//! Identity allocation and sparse-set component storage for Strata.
//!
//! This crate provides:
//! - [`IdentityAllocator`] - Entity id allocation with recycling
//! - [`ComponentPool`] - Per-type sparse-set component storage
//! - [`ErasedPool`] - Type-erased pool access for cross-pool cleanup

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod allocator;
pub mod pool;

pub use allocator::IdentityAllocator;
pub use pool::{ComponentPool, ErasedPool};
