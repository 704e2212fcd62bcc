//! Core types, component contracts, and errors for Strata.
//!
//! This crate provides:
//! - [`EntityId`] - Opaque recyclable entity identifiers
//! - [`Component`] / [`SingletonComponent`] - Component capability contracts
//! - [`ComponentType`] - Runtime component type tags
//! - [`SerializedForm`] - Opaque serialized component payloads
//! - [`Error`] - Error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod entity;
pub mod error;

pub use component::{Component, ComponentType, SerializedForm, SingletonComponent};
pub use entity::EntityId;
pub use error::{Error, ErrorContext, ErrorKind, Result};
