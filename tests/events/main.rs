//! Integration tests for Layer 2: Events
//!
//! Tests for channel registration, ordered delivery, and nested publishing.
