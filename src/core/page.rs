//! Paging and sorting requests for listing a whole collection

use serde::{Deserialize, Serialize};

/// Direction of a listing by identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Lowest identifier first
    #[default]
    Ascending,
    /// Highest identifier first
    Descending,
}

/// One page of a collection listing
///
/// Pages are numbered from 0. A zero `size` is treated as 1.
///
/// # Example
/// ```rust,ignore
/// let request = PageRequest::new(2, 20).sorted(SortOrder::Descending);
/// let page = invoices.find_page(&request).await?;
/// println!("{} of {} invoices", page.items.len(), page.total);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Page index (starts at 0)
    pub page: u64,

    /// Number of items per page
    pub size: u64,

    /// Identifier order of the listing
    pub order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, 20)
    }
}

impl PageRequest {
    /// Request page `page` of `size` items, ascending
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            order: SortOrder::Ascending,
        }
    }

    /// Same request with another identifier order
    pub fn sorted(self, order: SortOrder) -> Self {
        Self { order, ..self }
    }

    /// Get the page size, ensuring a minimum of 1
    pub fn size(&self) -> u64 {
        self.size.max(1)
    }

    /// Number of rows before this page
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size())
    }
}

/// A page of entities with the size of the whole collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// The entities on this page
    pub items: Vec<T>,

    /// Page index (starts at 0)
    pub page: u64,

    /// Requested number of items per page
    pub size: u64,

    /// Total number of entities in the collection
    pub total: u64,
}

impl<T> Page<T> {
    /// Total number of pages
    pub fn total_pages(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            self.total.div_ceil(self.size.max(1))
        }
    }

    /// Whether a page follows this one
    pub fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages()
    }

    /// Whether a page precedes this one
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}
