//! Storage engines and the generic repository built on top of them

pub mod in_memory;
#[cfg(feature = "lmdb")]
pub mod lmdb;
pub mod repository;

pub use in_memory::InMemoryEngine;
#[cfg(feature = "lmdb")]
pub use lmdb::{LmdbEngine, LmdbOptions};
pub use repository::Repository;

use crate::config::BackendConfig;
use crate::core::{StorageEngine, StoreResult};
use std::sync::Arc;

/// Open the engine described by `config`
pub fn open_engine(config: &BackendConfig) -> StoreResult<Arc<dyn StorageEngine>> {
    match config {
        BackendConfig::InMemory => {
            tracing::info!(engine = "in_memory", "Storage engine opened");
            Ok(Arc::new(InMemoryEngine::new()))
        }
        #[cfg(feature = "lmdb")]
        BackendConfig::Lmdb {
            path,
            map_size_mb,
            max_dbs,
        } => {
            let options = LmdbOptions {
                map_size_mb: *map_size_mb,
                max_dbs: *max_dbs,
                ..LmdbOptions::default()
            };
            Ok(Arc::new(LmdbEngine::open_with(path, &options)?))
        }
        #[cfg(not(feature = "lmdb"))]
        BackendConfig::Lmdb { .. } => Err(crate::core::StoreError::config(
            "the lmdb backend requires the `lmdb` feature",
        )),
    }
}
