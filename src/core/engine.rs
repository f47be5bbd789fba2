//! Boundary to the backing storage engine
//!
//! A [`StorageEngine`] stores opaque byte values under byte keys, grouped in
//! named collections. It knows nothing about entities: encoding records and
//! mapping identifiers to keys is the job of the repository sitting on top.

use crate::core::error::StoreResult;
use crate::core::page::SortOrder;
use async_trait::async_trait;

/// Outcome of an all-or-nothing batch removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRemoval {
    /// Every key was present and has been removed
    Removed(u64),
    /// The key at this position was absent; nothing was removed
    Missing(usize),
}

/// One window of a collection scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Values inside the window, in scan order
    pub values: Vec<Vec<u8>>,
    /// Number of rows in the whole collection
    pub total: u64,
}

/// Storage engine trait for keyed collections
///
/// Implementations are responsible for their own locking and isolation.
/// Every operation must fail with `StoreError::StorageUnavailable` once the
/// engine has been closed.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// Short engine name used in logs (e.g., "in_memory", "lmdb")
    fn name(&self) -> &'static str;

    /// Create the collection if it does not exist yet
    async fn ensure_collection(&self, collection: &str) -> StoreResult<()>;

    /// Insert or replace a batch of rows atomically.
    ///
    /// The collection sequence is raised to at least `sequence_floor` in the
    /// same write. Returns how many rows replaced an existing value.
    async fn put_batch(
        &self,
        collection: &str,
        rows: Vec<(Vec<u8>, Vec<u8>)>,
        sequence_floor: u64,
    ) -> StoreResult<u64>;

    /// Insert or replace a single row, returning whether it replaced one
    async fn put(
        &self,
        collection: &str,
        key: Vec<u8>,
        value: Vec<u8>,
        sequence_floor: u64,
    ) -> StoreResult<bool> {
        let replaced = self
            .put_batch(collection, vec![(key, value)], sequence_floor)
            .await?;
        Ok(replaced > 0)
    }

    /// Look up a value by key
    async fn get(&self, collection: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// All values of the collection, in ascending key order
    async fn scan(&self, collection: &str) -> StoreResult<Vec<Vec<u8>>>;

    /// Skip `offset` rows in `order`, then return up to `limit` values.
    ///
    /// The window and the total are read from the same snapshot.
    async fn scan_page(
        &self,
        collection: &str,
        offset: u64,
        limit: u64,
        order: SortOrder,
    ) -> StoreResult<ScanPage>;

    /// Check for a key without reading its value
    async fn contains(&self, collection: &str, key: &[u8]) -> StoreResult<bool>;

    /// Remove a key, returning whether it existed
    async fn remove(&self, collection: &str, key: &[u8]) -> StoreResult<bool>;

    /// Remove every key, or none of them if any key is absent
    async fn remove_batch(
        &self,
        collection: &str,
        keys: Vec<Vec<u8>>,
    ) -> StoreResult<BatchRemoval>;

    /// Remove every row of the collection, returning how many were removed
    async fn clear(&self, collection: &str) -> StoreResult<u64>;

    /// Number of rows in the collection
    async fn count(&self, collection: &str) -> StoreResult<u64>;

    /// Reserve `count` consecutive sequence values and return the first.
    ///
    /// Sequences start at 1 and never hand out the same value twice. Fails
    /// with `SequenceExhausted`, leaving the sequence untouched, when the
    /// reservation would run past `u64::MAX`.
    async fn next_sequence(&self, collection: &str, count: u64) -> StoreResult<u64>;

    /// Release the engine. Later calls fail with `StorageUnavailable`.
    async fn close(&self) -> StoreResult<()>;

    /// Check if the engine still accepts operations
    fn is_open(&self) -> bool;
}

impl std::fmt::Debug for dyn StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("name", &self.name())
            .field("open", &self.is_open())
            .finish()
    }
}
