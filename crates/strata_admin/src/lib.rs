//! The Strata Admin: entities, pools, singletons, events, and systems.
//!
//! This crate provides:
//! - [`Admin`] - The registry that owns every pool and wires everything together
//! - [`System`] / [`SystemExt`] - Behavior declared by required components and subscriptions
//! - [`EntityBuilder`] - Create an entity with a set of components in one step
//! - [`EntityRef`] - Read-only view of a live entity
//! - [`Query`] - Lazy iteration over entities holding a component set
//! - [`AdminConfig`] - Construction parameters

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod admin;
pub mod builder;
pub mod config;
pub mod entity;
pub mod query;
pub mod system;

pub use admin::Admin;
pub use builder::EntityBuilder;
pub use config::{AdminConfig, DEFAULT_MAX_ENTITIES};
pub use entity::EntityRef;
pub use query::Query;
pub use strata_events::Event;
pub use system::{Subscription, System, SystemExt};
