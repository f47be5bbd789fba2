//! Invoice entity

use crate::impl_entity;
use crate::storage::Repository;
use chrono::{DateTime, Utc};

impl_entity!(Invoice, i64, "invoice", "invoices", {
    /// Invoice number as printed on the document
    number: String,
    /// When the invoice was issued
    issued_at: DateTime<Utc>,
    /// Total amount, in cents
    amount_cents: i64,
});

/// Store for invoices
pub type InvoiceRepository = Repository<Invoice>;
