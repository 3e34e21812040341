//! Fixed-size page windows over the scraped record set.

use std::ops::Range;

/// Records shown per page.
pub const PAGE_SIZE: usize = 10;

/// Number of pages needed for `total` records. Zero records means zero pages.
#[must_use]
pub fn page_count(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Global index range `[(page-1)*10, page*10)` clipped to `total`.
/// Page 0 and pages past the end yield an empty range.
#[must_use]
pub fn page_range(total: usize, page: usize) -> Range<usize> {
    if page == 0 {
        return 0..0;
    }
    let start = (page - 1).saturating_mul(PAGE_SIZE).min(total);
    let end = start.saturating_add(PAGE_SIZE).min(total);
    start..end
}

/// The contiguous slice of `records` shown on 1-based `page`.
#[must_use]
pub fn page_slice<T>(records: &[T], page: usize) -> &[T] {
    &records[page_range(records.len(), page)]
}

/// Tracks the active 1-based page over a record set of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    total: usize,
}

impl Paginator {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self { page: 1, total }
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        page_count(self.total)
    }

    /// Moves to page `n`, clamped into `[1, max(1, page_count)]`, and returns
    /// the page actually selected.
    pub fn set_page(&mut self, n: usize) -> usize {
        self.page = n.clamp(1, self.page_count().max(1));
        self.page
    }

    /// A new record set replaced the old one: back to page 1.
    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.page = 1;
    }

    /// Global index range of the active page.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        page_range(self.total, self.page)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}
