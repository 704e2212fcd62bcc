//! Named-channel event bus for Strata.
//!
//! This crate provides:
//! - [`EventBus`] - Channel registry with ordered, synchronous delivery
//! - [`Event`] - The channel and payload handed to each subscriber
//! - [`Handler`] - The shared subscriber type

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bus;

pub use bus::{Event, EventBus, Handler};
