//! Typed error handling for the entity stores
//!
//! Every store operation returns [`StoreResult`], so callers can match on the
//! failure category instead of inspecting a generic `anyhow::Error`.
//!
//! # Error Categories
//!
//! - [`StoreError::NotFound`]: an operation that requires presence hit a missing id
//! - [`StoreError::StorageUnavailable`]: the engine is closed, unreachable or failing
//! - [`StoreError::SequenceExhausted`]: no identifier is left to generate
//! - [`StoreError::Serialization`]: a record payload could not be encoded/decoded
//! - [`StoreError::Config`]: invalid or unreadable configuration
//!
//! # Example
//!
//! ```rust,ignore
//! match invoices.delete_by_id(&42).await {
//!     Ok(()) => println!("deleted"),
//!     Err(StoreError::NotFound { id, .. }) => println!("invoice {} not found", id),
//!     Err(e) => eprintln!("storage failure: {}", e),
//! }
//! ```

use thiserror::Error;

/// Result alias used by every store and engine operation
pub type StoreResult<T> = Result<T, StoreError>;

/// The error type surfaced by stores and storage engines
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested identifier is absent
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: String },

    /// The backing engine is closed, unreachable or failing
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// The collection sequence cannot produce another identifier
    #[error("Identifier sequence of '{collection}' is exhausted")]
    SequenceExhausted { collection: String },

    /// A record could not be serialized or deserialized
    #[error("Failed to serialize/deserialize {entity_type}: {message}")]
    Serialization { entity_type: String, message: String },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl StoreError {
    /// Build a `NotFound` error for the given entity type and identifier
    pub fn not_found(entity_type: impl Into<String>, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Build a `StorageUnavailable` error from any displayable cause
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        StoreError::StorageUnavailable {
            message: message.to_string(),
        }
    }

    /// Build a `SequenceExhausted` error for a collection
    pub fn exhausted(collection: impl Into<String>) -> Self {
        StoreError::SequenceExhausted {
            collection: collection.into(),
        }
    }

    /// Build a `Config` error
    pub fn config(message: impl Into<String>) -> Self {
        StoreError::Config {
            message: message.into(),
        }
    }

    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "ENTITY_NOT_FOUND",
            StoreError::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
            StoreError::SequenceExhausted { .. } => "SEQUENCE_EXHAUSTED",
            StoreError::Serialization { .. } => "ENTITY_SERIALIZATION_ERROR",
            StoreError::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Check if the backing engine could not serve the request
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::StorageUnavailable { .. })
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::unavailable(format_args!("blocking storage task failed: {}", err))
    }
}

#[cfg(feature = "lmdb")]
impl From<heed::Error> for StoreError {
    fn from(err: heed::Error) -> Self {
        StoreError::unavailable(format_args!("lmdb: {}", err))
    }
}
