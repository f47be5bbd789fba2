//! Order-management entities and their repositories

pub mod delivery;
pub mod invoice;
pub mod macros;

pub use delivery::{Delivery, DeliveryRepository};
pub use invoice::{Invoice, InvoiceRepository};
