//! Store host owning the storage engine lifecycle
//!
//! The host opens one engine at startup, builds every repository over that
//! single injected handle, and closes it at shutdown. Nothing in the crate
//! reaches the engine through global state.

use crate::config::StoreConfig;
use crate::core::{StorageEngine, StoreResult};
use crate::entities::{DeliveryRepository, InvoiceRepository};
use crate::storage::open_engine;
use std::sync::Arc;

/// Host context containing the engine and the repositories built on it
///
/// # Example
///
/// ```rust,ignore
/// let host = StoreHost::open(&StoreConfig::default()).await?;
///
/// let invoice = host.invoices().save(invoice).await?;
/// let deliveries = host.deliveries().find_all().await?;
///
/// host.close().await?;
/// ```
#[derive(Clone, Debug)]
pub struct StoreHost {
    engine: Arc<dyn StorageEngine>,
    invoices: InvoiceRepository,
    deliveries: DeliveryRepository,
}

impl StoreHost {
    /// Validate `config`, open its engine and build the repositories
    pub async fn open(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let engine = open_engine(&config.backend)?;
        Self::with_engine(engine).await
    }

    /// Build the host around an engine opened by the caller
    pub async fn with_engine(engine: Arc<dyn StorageEngine>) -> StoreResult<Self> {
        let invoices = InvoiceRepository::open(Arc::clone(&engine)).await?;
        let deliveries = DeliveryRepository::open(Arc::clone(&engine)).await?;

        tracing::info!(engine = engine.name(), "Store host ready");

        Ok(Self {
            engine,
            invoices,
            deliveries,
        })
    }

    /// Invoice repository
    pub fn invoices(&self) -> &InvoiceRepository {
        &self.invoices
    }

    /// Delivery repository
    pub fn deliveries(&self) -> &DeliveryRepository {
        &self.deliveries
    }

    /// The shared engine handle
    pub fn engine(&self) -> &Arc<dyn StorageEngine> {
        &self.engine
    }

    /// Check if the engine still accepts operations
    pub fn is_open(&self) -> bool {
        self.engine.is_open()
    }

    /// Close the engine; both repositories become unavailable
    pub async fn close(&self) -> StoreResult<()> {
        self.engine.close().await?;
        tracing::info!(engine = self.engine.name(), "Store host closed");
        Ok(())
    }
}
