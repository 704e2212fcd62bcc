//! Strata - Minimal entity-component-system runtime
//!
//! This crate re-exports all layers of the Strata system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: strata_admin       - Admin registry, systems, entity builder, config
//! Layer 2: strata_events      - Named-channel event bus
//! Layer 1: strata_storage     - Identity allocator, sparse-set component pools
//! Layer 0: strata_foundation  - Core types (EntityId, Component, Error)
//! ```

pub use strata_admin as admin;
pub use strata_events as events;
pub use strata_foundation as foundation;
pub use strata_storage as storage;
