//! Pagination types

use crate::constants::PAGE_SIZE;
use serde::{Deserialize, Serialize};

/// A 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, starting at 1
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl PageRequest {
    /// Request a page with the default page size; page 0 is clamped to 1
    pub fn new(page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: PAGE_SIZE,
        }
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1)
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Page number that was served
    pub page: u32,
    /// Last page number (0 when empty)
    pub last_page: u64,
    /// Total number of items across all pages
    pub total: u64,
}

impl<T> Page<T> {
    /// Assemble a page, deriving `last_page` from `total`
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let per_page = u64::from(request.per_page.max(1));
        Self {
            items,
            page: request.page,
            last_page: total.div_ceil(per_page),
            total,
        }
    }
}
