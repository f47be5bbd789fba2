//! Delivery entity

use crate::impl_entity;
use crate::storage::Repository;
use chrono::{DateTime, Utc};

impl_entity!(Delivery, i64, "delivery", "deliveries", {
    /// Destination address
    address: String,
    /// When the parcel left the warehouse, if it has
    shipped_at: Option<DateTime<Utc>>,
});

/// Store for deliveries
pub type DeliveryRepository = Repository<Delivery>;
