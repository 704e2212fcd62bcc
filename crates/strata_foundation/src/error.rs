//! Error types for the Strata system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every failure is a local contract violation reported to the immediate
//! caller; nothing is retried or swallowed.

use std::fmt;

use thiserror::Error;

use crate::entity::EntityId;

/// The main error type for Strata operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating it if needed.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates a capacity exceeded error.
    #[must_use]
    pub fn capacity_exceeded(max_entities: usize) -> Self {
        Self::new(ErrorKind::CapacityExceeded { max_entities })
    }

    /// Creates an invalid entity error (freeing an id that is not issued).
    #[must_use]
    pub fn invalid_entity(id: EntityId) -> Self {
        Self::new(ErrorKind::InvalidEntity(id))
    }

    /// Creates an unknown entity error.
    #[must_use]
    pub fn unknown_entity(id: EntityId) -> Self {
        Self::new(ErrorKind::UnknownEntity(id))
    }

    /// Creates a duplicate entity error.
    #[must_use]
    pub fn duplicate_entity(id: EntityId) -> Self {
        Self::new(ErrorKind::DuplicateEntity(id))
    }

    /// Creates an unknown component type error.
    #[must_use]
    pub fn unknown_component_type(name: &'static str) -> Self {
        Self::new(ErrorKind::UnknownComponentType(name))
    }

    /// Creates a duplicate component type error.
    #[must_use]
    pub fn duplicate_component_type(name: &'static str) -> Self {
        Self::new(ErrorKind::DuplicateComponentType(name))
    }

    /// Creates an unknown singleton error.
    #[must_use]
    pub fn unknown_singleton(name: &'static str) -> Self {
        Self::new(ErrorKind::UnknownSingleton(name))
    }

    /// Creates an unknown channel error.
    #[must_use]
    pub fn unknown_channel(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownChannel(name.into()))
    }

    /// Creates a duplicate channel error.
    #[must_use]
    pub fn duplicate_channel(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateChannel(name.into()))
    }

    /// Creates an out of range error.
    #[must_use]
    pub fn out_of_range(id: EntityId, capacity: usize) -> Self {
        Self::new(ErrorKind::OutOfRange { id, capacity })
    }

    /// Creates a payload mismatch error.
    #[must_use]
    pub fn payload_mismatch(channel: impl Into<String>, expected: &'static str) -> Self {
        Self::new(ErrorKind::PayloadMismatch {
            channel: channel.into(),
            expected,
        })
    }

    /// Creates a systems already initialized error.
    #[must_use]
    pub fn systems_already_initialized() -> Self {
        Self::new(ErrorKind::SystemsAlreadyInitialized)
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfig(message.into()))
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization(message.into()))
    }

    /// Creates a handler failure, for use by event subscribers.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Handler(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No entity id is available: the cap is reached and nothing is recycled.
    #[error("capacity exceeded: all {max_entities} entity ids are in use")]
    CapacityExceeded {
        /// The configured entity cap.
        max_entities: usize,
    },

    /// An id was returned to the allocator that it does not consider issued.
    #[error("invalid entity: {0:?} is not an issued id")]
    InvalidEntity(EntityId),

    /// Entity is not alive.
    #[error("unknown entity: {0:?}")]
    UnknownEntity(EntityId),

    /// Entity already holds the component.
    #[error("duplicate entity: {0:?} is already present")]
    DuplicateEntity(EntityId),

    /// No pool exists for the component type.
    #[error("unknown component type: {0}")]
    UnknownComponentType(&'static str),

    /// A pool for the component type already exists.
    #[error("duplicate component type: {0}")]
    DuplicateComponentType(&'static str),

    /// No singleton of the given type was added.
    #[error("unknown singleton component: {0}")]
    UnknownSingleton(&'static str),

    /// Event channel was never registered.
    #[error("unknown event channel: {0}")]
    UnknownChannel(String),

    /// Event channel is already registered.
    #[error("duplicate event channel: {0}")]
    DuplicateChannel(String),

    /// Entity id exceeds the configured capacity.
    #[error("entity {id:?} out of range (capacity {capacity})")]
    OutOfRange {
        /// The offending id.
        id: EntityId,
        /// The capacity of the storage that rejected it.
        capacity: usize,
    },

    /// Subscriber expected a different payload type than was published.
    #[error("payload mismatch on channel {channel}: expected {expected}")]
    PayloadMismatch {
        /// The channel being delivered.
        channel: String,
        /// Type name the subscriber asked for.
        expected: &'static str,
    },

    /// Systems were already wired into the event bus.
    #[error("systems already initialized")]
    SystemsAlreadyInitialized,

    /// Construction parameters are invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Component serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An event subscriber reported a failure.
    #[error("handler failed: {0}")]
    Handler(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Frames the error propagated through, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.stack {
            writeln!(f, "  in {frame}")?;
        }
        Ok(())
    }
}

/// Result alias used throughout Strata.
pub type Result<T> = std::result::Result<T, Error>;
