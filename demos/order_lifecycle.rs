//! Walk an invoice and a delivery through their store lifecycle
//!
//! ```sh
//! cargo run --example order_lifecycle
//! ORDER_STORE_CONFIG=store.yaml cargo run --example order_lifecycle --features lmdb
//! ```

use order_store::logging;
use order_store::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::var("ORDER_STORE_CONFIG") {
        Ok(path) => StoreConfig::from_yaml_file(&path)?,
        Err(_) => StoreConfig::default(),
    };
    logging::init(&config.logging.filter);

    let host = StoreHost::open(&config).await?;

    let invoice = host
        .invoices()
        .save(Invoice::new("F-2024-001".to_string(), Utc::now(), 12_500))
        .await?;
    tracing::info!(id = ?invoice.id, number = %invoice.number, "Invoice saved");

    let mut delivery = host
        .deliveries()
        .save(Delivery::new("14 rue du Commerce, Lyon".to_string(), None))
        .await?;
    delivery.shipped_at = Some(Utc::now());
    let delivery = host.deliveries().save(delivery).await?;
    tracing::info!(id = ?delivery.id, "Delivery shipped");

    let invoices = host.invoices().count().await?;
    let deliveries = host.deliveries().count().await?;
    tracing::info!(invoices, deliveries, "Store contents");

    if let Some(id) = delivery.id {
        host.deliveries().delete_by_id(&id).await?;
        let exists = host.deliveries().exists_by_id(&id).await?;
        tracing::info!(id, exists, "Delivery deleted");
    }

    host.close().await?;
    Ok(())
}
