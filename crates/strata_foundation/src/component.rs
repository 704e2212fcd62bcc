//! Component contracts and runtime type tags.
//!
//! At the storage layer a component is an opaque typed payload. The only
//! capability the core asks of a component type is that it can turn itself
//! into a [`SerializedForm`] and back; what that form contains is owned by
//! the component type.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// A typed data record attachable to an entity.
pub trait Component: Any + Sized {
    /// Converts this component into its serialized form.
    ///
    /// # Errors
    ///
    /// Returns an error if the component cannot be encoded.
    fn serialize(&self) -> Result<SerializedForm>;

    /// Reconstructs a component from its serialized form.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not describe a valid component.
    fn deserialize(data: &SerializedForm) -> Result<Self>;

    /// Human-readable name of the component type.
    #[must_use]
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A component with exactly one instance per registry.
///
/// Singletons hold process- or frame-wide state (the latest input snapshot,
/// the elapsed time) that every system may read without any entity carrying
/// a copy.
pub trait SingletonComponent: Component {}

/// Runtime tag identifying a component type.
#[derive(Copy, Clone)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    /// Returns the tag for `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::type_name(),
        }
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.name)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Opaque serialized representation of a component.
///
/// The helpers encode with named `MessagePack` so field names survive and
/// forms stay readable across field reordering.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct SerializedForm(Vec<u8>);

impl SerializedForm {
    /// Wraps raw bytes produced by a component's own encoder.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Encodes any serde value as named `MessagePack`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self> {
        rmp_serde::to_vec_named(value)
            .map(Self)
            .map_err(|e| Error::serialization(e.to_string()))
    }

    /// Decodes a serde value previously produced by [`SerializedForm::encode`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes do not decode into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        rmp_serde::from_slice(&self.0).map_err(|e| Error::serialization(e.to_string()))
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the form, returning the raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the encoded length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the form holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SerializedForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerializedForm({} bytes)", self.0.len())
    }
}
