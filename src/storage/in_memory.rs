//! In-memory implementation of StorageEngine for testing and development

use crate::core::{BatchRemoval, ScanPage, SortOrder, StorageEngine, StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Collection {
    rows: BTreeMap<Vec<u8>, Vec<u8>>,
    /// Last sequence value handed out or observed
    sequence: u64,
}

/// In-memory storage engine
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Rows are kept in a `BTreeMap` so scans come back in key order, like the
/// persistent engines.
#[derive(Clone, Debug)]
pub struct InMemoryEngine {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
    open: Arc<AtomicBool>,
}

impl InMemoryEngine {
    /// Create a new, empty in-memory engine
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::unavailable("in-memory engine is closed"))
        }
    }

    fn read<R>(&self, f: impl FnOnce(&HashMap<String, Collection>) -> R) -> StoreResult<R> {
        self.ensure_open()?;
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::unavailable(format_args!("Failed to acquire read lock: {}", e)))?;
        Ok(f(&collections))
    }

    fn write<R>(&self, f: impl FnOnce(&mut HashMap<String, Collection>) -> R) -> StoreResult<R> {
        self.ensure_open()?;
        let mut collections = self.collections.write().map_err(|e| {
            StoreError::unavailable(format_args!("Failed to acquire write lock: {}", e))
        })?;
        Ok(f(&mut collections))
    }
}

impl Default for InMemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageEngine for InMemoryEngine {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    async fn ensure_collection(&self, collection: &str) -> StoreResult<()> {
        self.write(|collections| {
            collections.entry(collection.to_owned()).or_default();
        })
    }

    async fn put_batch(
        &self,
        collection: &str,
        rows: Vec<(Vec<u8>, Vec<u8>)>,
        sequence_floor: u64,
    ) -> StoreResult<u64> {
        self.write(|collections| {
            let target = collections.entry(collection.to_owned()).or_default();
            target.sequence = target.sequence.max(sequence_floor);
            rows.into_iter()
                .filter_map(|(key, value)| target.rows.insert(key, value))
                .count() as u64
        })
    }

    async fn get(&self, collection: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.read(|collections| {
            collections
                .get(collection)
                .and_then(|c| c.rows.get(key).cloned())
        })
    }

    async fn scan(&self, collection: &str) -> StoreResult<Vec<Vec<u8>>> {
        self.read(|collections| {
            collections
                .get(collection)
                .map(|c| c.rows.values().cloned().collect())
                .unwrap_or_default()
        })
    }

    async fn scan_page(
        &self,
        collection: &str,
        offset: u64,
        limit: u64,
        order: SortOrder,
    ) -> StoreResult<ScanPage> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        self.read(|collections| {
            let Some(c) = collections.get(collection) else {
                return ScanPage::default();
            };
            let values = match order {
                SortOrder::Ascending => {
                    c.rows.values().skip(offset).take(limit).cloned().collect()
                }
                SortOrder::Descending => c
                    .rows
                    .values()
                    .rev()
                    .skip(offset)
                    .take(limit)
                    .cloned()
                    .collect(),
            };
            ScanPage {
                values,
                total: c.rows.len() as u64,
            }
        })
    }

    async fn contains(&self, collection: &str, key: &[u8]) -> StoreResult<bool> {
        self.read(|collections| {
            collections
                .get(collection)
                .is_some_and(|c| c.rows.contains_key(key))
        })
    }

    async fn remove(&self, collection: &str, key: &[u8]) -> StoreResult<bool> {
        self.write(|collections| {
            collections
                .get_mut(collection)
                .is_some_and(|c| c.rows.remove(key).is_some())
        })
    }

    async fn remove_batch(
        &self,
        collection: &str,
        keys: Vec<Vec<u8>>,
    ) -> StoreResult<BatchRemoval> {
        self.write(|collections| {
            let Some(target) = collections.get_mut(collection) else {
                return if keys.is_empty() {
                    BatchRemoval::Removed(0)
                } else {
                    BatchRemoval::Missing(0)
                };
            };

            // Check everything first so a missing key leaves the collection untouched
            if let Some(pos) = keys.iter().position(|k| !target.rows.contains_key(k)) {
                return BatchRemoval::Missing(pos);
            }

            let removed = keys
                .iter()
                .filter(|k| target.rows.remove(k.as_slice()).is_some())
                .count();
            BatchRemoval::Removed(removed as u64)
        })
    }

    async fn clear(&self, collection: &str) -> StoreResult<u64> {
        self.write(|collections| {
            collections.get_mut(collection).map_or(0, |c| {
                let removed = c.rows.len() as u64;
                c.rows.clear();
                removed
            })
        })
    }

    async fn count(&self, collection: &str) -> StoreResult<u64> {
        self.read(|collections| {
            collections
                .get(collection)
                .map_or(0, |c| c.rows.len() as u64)
        })
    }

    async fn next_sequence(&self, collection: &str, count: u64) -> StoreResult<u64> {
        self.write(|collections| {
            let target = collections.entry(collection.to_owned()).or_default();
            let (Some(first), Some(last)) = (
                target.sequence.checked_add(1),
                target.sequence.checked_add(count),
            ) else {
                return Err(StoreError::exhausted(collection));
            };
            target.sequence = last;
            Ok(first)
        })?
    }

    async fn close(&self) -> StoreResult<()> {
        if self.open.swap(false, Ordering::AcqRel) {
            tracing::info!(engine = "in_memory", "Storage engine closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}
