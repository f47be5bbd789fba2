//! Store trait for entity CRUD operations

use crate::core::Entity;
use crate::core::error::StoreResult;
use crate::core::page::{Page, PageRequest, SortOrder};
use async_trait::async_trait;

/// Store trait giving uniform CRUD access to one entity kind
///
/// The trait carries no entity-specific logic. Every entity kind gets the
/// exact same contract, and the storage mechanism underneath is pluggable.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    /// Insert a new entity or replace the one stored under its identifier.
    ///
    /// A transient entity is given the next identifier of the collection.
    /// The returned entity always carries its identifier.
    async fn save(&self, entity: T) -> StoreResult<T>;

    /// Save a batch of entities atomically, returned in input order
    async fn save_all(&self, entities: Vec<T>) -> StoreResult<Vec<T>>;

    /// Get an entity by ID, `None` when absent
    async fn find_by_id(&self, id: &T::Id) -> StoreResult<Option<T>>;

    /// List all entities, in ascending identifier order
    async fn find_all(&self) -> StoreResult<Vec<T>>;

    /// List all entities in the given identifier order
    async fn find_all_sorted(&self, order: SortOrder) -> StoreResult<Vec<T>>;

    /// Get one page of entities along with the collection total.
    ///
    /// A page past the end is empty but still reports the total.
    async fn find_page(&self, request: &PageRequest) -> StoreResult<Page<T>>;

    /// Get the entities matching `ids`, in request order, skipping absent ones
    async fn find_all_by_id(&self, ids: &[T::Id]) -> StoreResult<Vec<T>>;

    /// Check if an entity exists without decoding it
    async fn exists_by_id(&self, id: &T::Id) -> StoreResult<bool>;

    /// Total number of stored entities
    async fn count(&self) -> StoreResult<u64>;

    /// Delete an entity by ID, failing with `NotFound` when absent
    async fn delete_by_id(&self, id: &T::Id) -> StoreResult<()>;

    /// Delete the stored entity sharing this entity's identifier
    async fn delete(&self, entity: &T) -> StoreResult<()>;

    /// Delete every listed ID; nothing is deleted if one of them is absent
    async fn delete_all_by_id(&self, ids: &[T::Id]) -> StoreResult<()>;

    /// Delete every entity, returning how many were removed
    async fn delete_all(&self) -> StoreResult<u64>;
}
