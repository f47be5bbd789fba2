//! LMDB storage engine using heed (memory-mapped B-tree).
//!
//! LMDB is an embedded key-value store. No external server required.
//! All operations are synchronous (memory-mapped I/O) and are wrapped in
//! `tokio::task::spawn_blocking` for async compatibility.
//!
//! # Databases (named LMDB sub-databases)
//!
//! - one database per collection (e.g. `invoices`, `deliveries`), mapping
//!   identifier key bytes to JSON-encoded records
//! - `__sequences`: collection name → last sequence value (8 bytes, big-endian)
//!
//! Every mutation, including its sequence update, happens in a single write
//! transaction, so a batch is either fully applied or not at all.
//!
//! # Feature flag
//!
//! Enable with `--features lmdb`. Requires the `heed` crate.

use crate::core::{BatchRemoval, ScanPage, SortOrder, StorageEngine, StoreError, StoreResult};
use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RwTxn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

const SEQUENCES_DB: &str = "__sequences";

type RawDb = Database<Bytes, Bytes>;

/// Options used to open an LMDB environment
#[derive(Debug, Clone)]
pub struct LmdbOptions {
    /// Map size in megabytes (a virtual address space reservation)
    pub map_size_mb: usize,
    /// Maximum number of named databases
    pub max_dbs: u32,
    /// Maximum number of concurrent read transactions
    pub max_readers: u32,
}

impl Default for LmdbOptions {
    fn default() -> Self {
        Self {
            map_size_mb: 256,
            max_dbs: 16,
            max_readers: 126,
        }
    }
}

struct OpenEnv {
    env: Env,
    sequences: RawDb,
    collections: RwLock<HashMap<String, RawDb>>,
}

/// LMDB-backed implementation of `StorageEngine`.
///
/// The environment lives behind an `Arc`, so clones are cheap and share it.
/// Closing the engine drops the shared handle; the environment itself is
/// released once the last in-flight operation finishes.
///
/// # Example
///
/// ```rust,ignore
/// use order_store::storage::LmdbEngine;
///
/// let engine = LmdbEngine::open("/tmp/orders-lmdb")?;
/// let invoices = InvoiceRepository::open(Arc::new(engine)).await?;
/// ```
#[derive(Clone)]
pub struct LmdbEngine {
    path: PathBuf,
    inner: Arc<RwLock<Option<Arc<OpenEnv>>>>,
}

impl std::fmt::Debug for LmdbEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmdbEngine")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}

impl LmdbEngine {
    /// Open (or create) an LMDB environment at `path` with default options
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path, &LmdbOptions::default())
    }

    /// Open (or create) an LMDB environment at `path`
    pub fn open_with(path: impl AsRef<Path>, options: &LmdbOptions) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path).map_err(|e| {
            StoreError::unavailable(format_args!(
                "cannot create lmdb directory {}: {}",
                path.display(),
                e
            ))
        })?;

        // SAFETY: the environment is opened once per engine and its memory map
        // is never handed out beyond the transactions created here.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(options.map_size_mb * 1024 * 1024)
                .max_dbs(options.max_dbs)
                .max_readers(options.max_readers)
                .open(&path)?
        };

        let mut wtxn = env.write_txn()?;
        let sequences: RawDb = env.create_database(&mut wtxn, Some(SEQUENCES_DB))?;
        wtxn.commit()?;

        tracing::info!(engine = "lmdb", path = %path.display(), "Storage engine opened");

        Ok(Self {
            path,
            inner: Arc::new(RwLock::new(Some(Arc::new(OpenEnv {
                env,
                sequences,
                collections: RwLock::new(HashMap::new()),
            })))),
        })
    }

    /// Directory holding the environment files
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn handle(&self) -> StoreResult<Arc<OpenEnv>> {
        let guard = self
            .inner
            .read()
            .map_err(|e| StoreError::unavailable(format_args!("Failed to acquire read lock: {}", e)))?;
        guard
            .clone()
            .ok_or_else(|| StoreError::unavailable("lmdb engine is closed"))
    }

    /// Run `f` on a blocking thread with the open environment
    async fn blocking<R, F>(&self, f: F) -> StoreResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&OpenEnv) -> StoreResult<R> + Send + 'static,
    {
        let handle = self.handle()?;
        tokio::task::spawn_blocking(move || f(&handle)).await?
    }
}

impl OpenEnv {
    /// Look up a collection database without creating it
    fn existing(&self, collection: &str) -> StoreResult<Option<RawDb>> {
        if let Some(db) = self.cached(collection)? {
            return Ok(Some(db));
        }
        let rtxn = self.env.read_txn()?;
        let db: Option<RawDb> = self.env.open_database(&rtxn, Some(collection))?;
        // Handles opened in an aborted transaction are closed by LMDB
        rtxn.commit()?;
        if let Some(db) = db {
            self.remember(collection, db)?;
        }
        Ok(db)
    }

    /// Look up or create a collection database inside a write transaction.
    ///
    /// A handle obtained here is only valid once `wtxn` commits, so it is
    /// cached by [`OpenEnv::commit`] rather than right away.
    fn create(&self, wtxn: &mut RwTxn<'_>, collection: &str) -> StoreResult<(RawDb, bool)> {
        if let Some(db) = self.cached(collection)? {
            return Ok((db, false));
        }
        let db: RawDb = self.env.create_database(wtxn, Some(collection))?;
        Ok((db, true))
    }

    /// Commit `wtxn`, then cache a handle that [`OpenEnv::create`] just opened
    fn commit(
        &self,
        wtxn: RwTxn<'_>,
        collection: &str,
        db: RawDb,
        fresh: bool,
    ) -> StoreResult<()> {
        wtxn.commit()?;
        if fresh {
            self.remember(collection, db)?;
        }
        Ok(())
    }

    fn cached(&self, collection: &str) -> StoreResult<Option<RawDb>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::unavailable(format_args!("Failed to acquire read lock: {}", e)))?;
        Ok(collections.get(collection).copied())
    }

    fn remember(&self, collection: &str, db: RawDb) -> StoreResult<()> {
        let mut collections = self.collections.write().map_err(|e| {
            StoreError::unavailable(format_args!("Failed to acquire write lock: {}", e))
        })?;
        collections.insert(collection.to_owned(), db);
        Ok(())
    }

    fn sequence(&self, wtxn: &RwTxn<'_>, collection: &str) -> StoreResult<u64> {
        Ok(self
            .sequences
            .get(wtxn, collection.as_bytes())?
            .and_then(decode_sequence)
            .unwrap_or(0))
    }

    fn set_sequence(&self, wtxn: &mut RwTxn<'_>, collection: &str, value: u64) -> StoreResult<()> {
        self.sequences
            .put(wtxn, collection.as_bytes(), &value.to_be_bytes())?;
        Ok(())
    }
}

/// Copy the values of one cursor window
fn window<'txn>(
    rows: impl Iterator<Item = heed::Result<(&'txn [u8], &'txn [u8])>>,
    offset: u64,
    limit: u64,
) -> StoreResult<Vec<Vec<u8>>> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let mut values = Vec::new();
    for item in rows.skip(offset).take(limit) {
        let (_key, bytes) = item?;
        values.push(bytes.to_vec());
    }
    Ok(values)
}

fn decode_sequence(bytes: &[u8]) -> Option<u64> {
    let raw: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(raw))
}

#[async_trait]
impl StorageEngine for LmdbEngine {
    fn name(&self) -> &'static str {
        "lmdb"
    }

    async fn ensure_collection(&self, collection: &str) -> StoreResult<()> {
        let collection = collection.to_owned();
        self.blocking(move |open| {
            let mut wtxn = open.env.write_txn()?;
            let (db, fresh) = open.create(&mut wtxn, &collection)?;
            open.commit(wtxn, &collection, db, fresh)
        })
        .await
    }

    async fn put_batch(
        &self,
        collection: &str,
        rows: Vec<(Vec<u8>, Vec<u8>)>,
        sequence_floor: u64,
    ) -> StoreResult<u64> {
        let collection = collection.to_owned();
        self.blocking(move |open| {
            let mut wtxn = open.env.write_txn()?;
            let (db, fresh) = open.create(&mut wtxn, &collection)?;

            let mut replaced = 0;
            for (key, value) in &rows {
                if db.get(&wtxn, key)?.is_some() {
                    replaced += 1;
                }
                db.put(&mut wtxn, key, value)?;
            }

            if open.sequence(&wtxn, &collection)? < sequence_floor {
                open.set_sequence(&mut wtxn, &collection, sequence_floor)?;
            }

            open.commit(wtxn, &collection, db, fresh)?;
            Ok(replaced)
        })
        .await
    }

    async fn get(&self, collection: &str, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let collection = collection.to_owned();
        let key = key.to_vec();
        self.blocking(move |open| {
            let Some(db) = open.existing(&collection)? else {
                return Ok(None);
            };
            let rtxn = open.env.read_txn()?;
            Ok(db.get(&rtxn, &key)?.map(<[u8]>::to_vec))
        })
        .await
    }

    async fn scan(&self, collection: &str) -> StoreResult<Vec<Vec<u8>>> {
        let collection = collection.to_owned();
        self.blocking(move |open| {
            let Some(db) = open.existing(&collection)? else {
                return Ok(Vec::new());
            };
            let rtxn = open.env.read_txn()?;
            let mut results = Vec::new();
            for item in db.iter(&rtxn)? {
                let (_key, bytes) = item?;
                results.push(bytes.to_vec());
            }
            Ok(results)
        })
        .await
    }

    async fn scan_page(
        &self,
        collection: &str,
        offset: u64,
        limit: u64,
        order: SortOrder,
    ) -> StoreResult<ScanPage> {
        let collection = collection.to_owned();
        self.blocking(move |open| {
            let Some(db) = open.existing(&collection)? else {
                return Ok(ScanPage::default());
            };
            let rtxn = open.env.read_txn()?;
            let total = db.len(&rtxn)?;
            let values = match order {
                SortOrder::Ascending => window(db.iter(&rtxn)?, offset, limit)?,
                SortOrder::Descending => window(db.rev_iter(&rtxn)?, offset, limit)?,
            };
            Ok(ScanPage { values, total })
        })
        .await
    }

    async fn contains(&self, collection: &str, key: &[u8]) -> StoreResult<bool> {
        let collection = collection.to_owned();
        let key = key.to_vec();
        self.blocking(move |open| {
            let Some(db) = open.existing(&collection)? else {
                return Ok(false);
            };
            let rtxn = open.env.read_txn()?;
            Ok(db.get(&rtxn, &key)?.is_some())
        })
        .await
    }

    async fn remove(&self, collection: &str, key: &[u8]) -> StoreResult<bool> {
        let collection = collection.to_owned();
        let key = key.to_vec();
        self.blocking(move |open| {
            let Some(db) = open.existing(&collection)? else {
                return Ok(false);
            };
            let mut wtxn = open.env.write_txn()?;
            let existed = db.delete(&mut wtxn, &key)?;
            wtxn.commit()?;
            Ok(existed)
        })
        .await
    }

    async fn remove_batch(
        &self,
        collection: &str,
        keys: Vec<Vec<u8>>,
    ) -> StoreResult<BatchRemoval> {
        let collection = collection.to_owned();
        self.blocking(move |open| {
            let Some(db) = open.existing(&collection)? else {
                return Ok(if keys.is_empty() {
                    BatchRemoval::Removed(0)
                } else {
                    BatchRemoval::Missing(0)
                });
            };

            let mut wtxn = open.env.write_txn()?;
            let mut removed = 0;
            for (pos, key) in keys.iter().enumerate() {
                if db.delete(&mut wtxn, key)? {
                    removed += 1;
                } else if !keys[..pos].contains(key) {
                    // Aborting rolls back every delete made so far
                    wtxn.abort();
                    return Ok(BatchRemoval::Missing(pos));
                }
            }
            wtxn.commit()?;
            Ok(BatchRemoval::Removed(removed))
        })
        .await
    }

    async fn clear(&self, collection: &str) -> StoreResult<u64> {
        let collection = collection.to_owned();
        self.blocking(move |open| {
            let Some(db) = open.existing(&collection)? else {
                return Ok(0);
            };
            let mut wtxn = open.env.write_txn()?;
            let removed = db.len(&wtxn)?;
            db.clear(&mut wtxn)?;
            wtxn.commit()?;
            Ok(removed)
        })
        .await
    }

    async fn count(&self, collection: &str) -> StoreResult<u64> {
        let collection = collection.to_owned();
        self.blocking(move |open| {
            let Some(db) = open.existing(&collection)? else {
                return Ok(0);
            };
            let rtxn = open.env.read_txn()?;
            Ok(db.len(&rtxn)?)
        })
        .await
    }

    async fn next_sequence(&self, collection: &str, count: u64) -> StoreResult<u64> {
        let collection = collection.to_owned();
        self.blocking(move |open| {
            let mut wtxn = open.env.write_txn()?;
            let current = open.sequence(&wtxn, &collection)?;
            let (Some(first), Some(last)) = (current.checked_add(1), current.checked_add(count))
            else {
                return Err(StoreError::exhausted(collection.as_str()));
            };
            open.set_sequence(&mut wtxn, &collection, last)?;
            wtxn.commit()?;
            Ok(first)
        })
        .await
    }

    async fn close(&self) -> StoreResult<()> {
        let mut guard = self.inner.write().map_err(|e| {
            StoreError::unavailable(format_args!("Failed to acquire write lock: {}", e))
        })?;
        if guard.take().is_some() {
            tracing::info!(engine = "lmdb", path = %self.path.display(), "Storage engine closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.read().map(|guard| guard.is_some()).unwrap_or(false)
    }
}
