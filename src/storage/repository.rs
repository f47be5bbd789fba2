//! Generic repository implementing `EntityStore<T>` over any storage engine
//!
//! There is exactly one implementation of the store contract. Each entity
//! kind gets its own instantiation (`Repository<Invoice>`,
//! `Repository<Delivery>`), and the engine handle is injected at
//! construction.
//!
//! # Serialization
//!
//! Records are stored as JSON bytes via `serde_json`, keyed by the
//! order-preserving encoding of their identifier (see `EntityId::to_key`).

use crate::core::{
    BatchRemoval, Entity, EntityId, EntityStore, Page, PageRequest, ScanPage, SortOrder,
    StorageEngine, StoreError, StoreResult,
};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

/// Encode an entity as JSON bytes for the engine.
fn encode<T: Entity>(entity: &T) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(entity).map_err(|e| StoreError::Serialization {
        entity_type: T::resource_name_singular().to_string(),
        message: format!("encode: {}", e),
    })
}

/// Decode an entity from JSON bytes.
fn decode<T: Entity>(bytes: &[u8]) -> StoreResult<T> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization {
        entity_type: T::resource_name_singular().to_string(),
        message: format!("decode: {}", e),
    })
}

/// Engine-backed implementation of `EntityStore<T>`.
///
/// Cloning is cheap: clones share the same engine handle.
///
/// # Example
///
/// ```rust,ignore
/// use order_store::prelude::*;
///
/// let engine: Arc<dyn StorageEngine> = Arc::new(InMemoryEngine::new());
/// let invoices = InvoiceRepository::open(engine).await?;
/// let saved = invoices.save(invoice).await?;
/// ```
pub struct Repository<T: Entity> {
    engine: Arc<dyn StorageEngine>,
    _marker: PhantomData<T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> std::fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &T::resource_name())
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl<T: Entity> Repository<T> {
    /// Create the repository over `engine`, making sure its collection exists
    pub async fn open(engine: Arc<dyn StorageEngine>) -> StoreResult<Self> {
        engine.ensure_collection(T::resource_name()).await?;
        tracing::debug!(
            collection = T::resource_name(),
            engine = engine.name(),
            "Repository opened"
        );
        Ok(Self {
            engine,
            _marker: PhantomData,
        })
    }

    /// Name of the backing collection
    pub fn collection(&self) -> &'static str {
        T::resource_name()
    }

    /// The injected engine handle
    pub fn engine(&self) -> &Arc<dyn StorageEngine> {
        &self.engine
    }

    /// Map a reserved sequence value onto the identifier type
    fn generated_id(&self, value: u64) -> StoreResult<T::Id> {
        T::Id::from_sequence(value).ok_or_else(|| {
            tracing::warn!(collection = self.collection(), value, "Identifier sequence exhausted");
            StoreError::exhausted(self.collection())
        })
    }

    fn not_found(id: impl std::fmt::Display) -> StoreError {
        StoreError::not_found(T::resource_name_singular(), id)
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for Repository<T> {
    async fn save(&self, mut entity: T) -> StoreResult<T> {
        let id = match entity.id() {
            Some(id) => id,
            None => {
                let next = self.engine.next_sequence(self.collection(), 1).await?;
                let id = self.generated_id(next)?;
                entity.set_id(id);
                id
            }
        };

        let bytes = encode(&entity)?;
        let replaced = self
            .engine
            .put(self.collection(), id.to_key(), bytes, id.sequence_floor())
            .await?;

        tracing::debug!(collection = self.collection(), id = %id, replaced, "Saved entity");
        Ok(entity)
    }

    async fn save_all(&self, mut entities: Vec<T>) -> StoreResult<Vec<T>> {
        if entities.is_empty() {
            return Ok(entities);
        }

        let transient = entities.iter().filter(|e| e.is_transient()).count() as u64;
        if transient > 0 {
            let first = self
                .engine
                .next_sequence(self.collection(), transient)
                .await?;
            // The engine reserved first..first + transient, so offsets cannot overflow
            let pending = entities.iter_mut().filter(|e| e.is_transient());
            for (offset, entity) in (0u64..).zip(pending) {
                entity.set_id(self.generated_id(first + offset)?);
            }
        }

        let mut rows = Vec::with_capacity(entities.len());
        let mut floor = 0u64;
        for entity in &entities {
            let id = entity.id().ok_or_else(|| Self::not_found("none"))?;
            floor = floor.max(id.sequence_floor());
            rows.push((id.to_key(), encode(entity)?));
        }

        let replaced = self
            .engine
            .put_batch(self.collection(), rows, floor)
            .await?;

        tracing::debug!(
            collection = self.collection(),
            saved = entities.len(),
            replaced,
            "Saved entity batch"
        );
        Ok(entities)
    }

    async fn find_by_id(&self, id: &T::Id) -> StoreResult<Option<T>> {
        tracing::debug!(collection = self.collection(), id = %id, "Finding entity");
        match self.engine.get(self.collection(), &id.to_key()).await? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> StoreResult<Vec<T>> {
        let rows = self.engine.scan(self.collection()).await?;
        tracing::debug!(collection = self.collection(), found = rows.len(), "Listed entities");
        rows.iter().map(|bytes| decode(bytes)).collect()
    }

    async fn find_all_sorted(&self, order: SortOrder) -> StoreResult<Vec<T>> {
        let mut entities = self.find_all().await?;
        if order == SortOrder::Descending {
            entities.reverse();
        }
        Ok(entities)
    }

    async fn find_page(&self, request: &PageRequest) -> StoreResult<Page<T>> {
        let ScanPage { values, total } = self
            .engine
            .scan_page(
                self.collection(),
                request.offset(),
                request.size(),
                request.order,
            )
            .await?;
        tracing::debug!(
            collection = self.collection(),
            page = request.page,
            size = request.size(),
            found = values.len(),
            total,
            "Listed entity page"
        );

        let items = values
            .iter()
            .map(|bytes| decode(bytes))
            .collect::<StoreResult<Vec<T>>>()?;
        Ok(Page {
            items,
            page: request.page,
            size: request.size(),
            total,
        })
    }

    async fn find_all_by_id(&self, ids: &[T::Id]) -> StoreResult<Vec<T>> {
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(bytes) = self.engine.get(self.collection(), &id.to_key()).await? {
                results.push(decode(&bytes)?);
            }
        }
        tracing::debug!(
            collection = self.collection(),
            requested = ids.len(),
            found = results.len(),
            "Found entities by id"
        );
        Ok(results)
    }

    async fn exists_by_id(&self, id: &T::Id) -> StoreResult<bool> {
        self.engine.contains(self.collection(), &id.to_key()).await
    }

    async fn count(&self) -> StoreResult<u64> {
        self.engine.count(self.collection()).await
    }

    async fn delete_by_id(&self, id: &T::Id) -> StoreResult<()> {
        if !self.engine.remove(self.collection(), &id.to_key()).await? {
            tracing::warn!(collection = self.collection(), id = %id, "Delete of missing entity");
            return Err(Self::not_found(id));
        }
        tracing::debug!(collection = self.collection(), id = %id, "Deleted entity");
        Ok(())
    }

    async fn delete(&self, entity: &T) -> StoreResult<()> {
        match entity.id() {
            Some(id) => self.delete_by_id(&id).await,
            None => {
                tracing::warn!(collection = self.collection(), "Delete of transient entity");
                Err(Self::not_found("none"))
            }
        }
    }

    async fn delete_all_by_id(&self, ids: &[T::Id]) -> StoreResult<()> {
        let keys = ids.iter().map(EntityId::to_key).collect();
        match self.engine.remove_batch(self.collection(), keys).await? {
            BatchRemoval::Removed(removed) => {
                tracing::debug!(collection = self.collection(), removed, "Deleted entity batch");
                Ok(())
            }
            BatchRemoval::Missing(pos) => {
                let id = ids[pos];
                tracing::warn!(
                    collection = self.collection(),
                    id = %id,
                    "Batch delete hit missing entity"
                );
                Err(Self::not_found(id))
            }
        }
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let removed = self.engine.clear(self.collection()).await?;
        tracing::debug!(collection = self.collection(), removed, "Deleted all entities");
        Ok(removed)
    }
}
