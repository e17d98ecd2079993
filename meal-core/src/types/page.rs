//! Pagination types

use serde::{Deserialize, Serialize};

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size when none is given
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Page request (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request, clamping the page size into `1..=MAX_PAGE_SIZE`
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let has_more = request.offset() + (items.len() as u64) < total;
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            has_more,
        }
    }

    /// Convert the items, keeping the paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            has_more: self.has_more,
        }
    }
}
