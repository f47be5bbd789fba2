//! Core module containing fundamental traits and types for the stores

pub mod engine;
pub mod entity;
pub mod error;
pub mod page;
pub mod store;

pub use engine::{BatchRemoval, ScanPage, StorageEngine};
pub use entity::{Entity, EntityId};
pub use error::{StoreError, StoreResult};
pub use page::{Page, PageRequest, SortOrder};
pub use store::EntityStore;
