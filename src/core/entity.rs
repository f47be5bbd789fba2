//! Entity traits defining the core abstraction for every stored record

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Numeric identifier type usable as a store key.
///
/// Keys are encoded as 8 big-endian bytes so that the engine's byte order
/// matches the numeric order of the identifiers.
pub trait EntityId:
    Copy + Eq + Ord + Hash + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Order-preserving key bytes for this identifier
    fn to_key(&self) -> Vec<u8>;

    /// Convert a value drawn from a collection sequence into an identifier.
    ///
    /// Returns `None` when the value does not fit the identifier type.
    fn from_sequence(value: u64) -> Option<Self>;

    /// The lowest sequence value that can no longer collide with this identifier.
    ///
    /// Non-positive identifiers never collide with generated ones and return 0.
    fn sequence_floor(&self) -> u64;
}

impl EntityId for i64 {
    fn to_key(&self) -> Vec<u8> {
        // Flip the sign bit so negative ids sort before positive ones
        ((*self as u64) ^ (1u64 << 63)).to_be_bytes().to_vec()
    }

    fn from_sequence(value: u64) -> Option<Self> {
        i64::try_from(value).ok()
    }

    fn sequence_floor(&self) -> u64 {
        if *self > 0 { *self as u64 } else { 0 }
    }
}

impl EntityId for u64 {
    fn to_key(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }

    fn from_sequence(value: u64) -> Option<Self> {
        Some(value)
    }

    fn sequence_floor(&self) -> u64 {
        *self
    }
}

/// Base trait for every entity kept in a store.
///
/// An entity is persisted and retrieved as a whole. Its identifier is
/// optional: an entity without one is *transient* and gets an identifier
/// assigned by the store on its first save.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Identifier type of this entity
    type Id: EntityId;

    /// The plural resource name, used as the collection name (e.g., "invoices")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "invoice")
    fn resource_name_singular() -> &'static str;

    /// Get the identifier, if one has been assigned
    fn id(&self) -> Option<Self::Id>;

    /// Assign the identifier
    fn set_id(&mut self, id: Self::Id);

    /// Check if the entity has never been given an identifier
    fn is_transient(&self) -> bool {
        self.id().is_none()
    }
}
