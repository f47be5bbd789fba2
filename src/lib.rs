//! # order-store
//!
//! Generic entity stores for the invoices and deliveries of an
//! order-management application.
//!
//! ## Features
//!
//! - **One generic store**: `Repository<T>` implements the `EntityStore<T>`
//!   CRUD contract once; invoices and deliveries are plain instantiations
//! - **Pluggable engines**: in-memory (default) or embedded LMDB (`lmdb` feature)
//! - **Generated identifiers**: transient entities get the next value of a
//!   per-collection sequence on first save
//! - **Explicit lifecycle**: `StoreHost` opens the engine at startup and
//!   closes it at shutdown; the handle is injected, never global
//! - **Paging**: `find_page` lists one page in either identifier order,
//!   along with the collection total
//! - **Typed errors**: `NotFound` / `StorageUnavailable` surfaced unchanged
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use order_store::prelude::*;
//!
//! let host = StoreHost::open(&StoreConfig::default()).await?;
//!
//! let invoice = host
//!     .invoices()
//!     .save(Invoice::new("F-2024-001".to_string(), Utc::now(), 12_500))
//!     .await?;
//! assert_eq!(invoice.id, Some(1));
//!
//! host.invoices().delete_by_id(&1).await?;
//! assert!(!host.invoices().exists_by_id(&1).await?);
//!
//! host.close().await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod host;
pub mod logging;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        BatchRemoval, Entity, EntityId, EntityStore, Page, PageRequest, SortOrder, StorageEngine,
        StoreError, StoreResult,
    };

    // === Macros ===
    pub use crate::impl_entity;

    // === Entities ===
    pub use crate::entities::{Delivery, DeliveryRepository, Invoice, InvoiceRepository};

    // === Storage ===
    pub use crate::storage::{InMemoryEngine, Repository, open_engine};
    #[cfg(feature = "lmdb")]
    pub use crate::storage::{LmdbEngine, LmdbOptions};

    // === Config ===
    pub use crate::config::{BackendConfig, LoggingConfig, StoreConfig};

    // === Host ===
    pub use crate::host::StoreHost;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
}
