//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: EntityId, Component contracts, and Error.
