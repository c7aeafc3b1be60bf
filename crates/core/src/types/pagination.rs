//! Page arithmetic for the catalog grid.
//!
//! Pages are 1-based. A list of `n` items split into pages of `size` has
//! `ceil(n / size)` pages; the last page holds the remainder.

use core::num::NonZeroUsize;
use core::ops::Range;

/// Pagination over a list of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    total: usize,
    page_size: NonZeroUsize,
}

impl Pagination {
    /// Paginate `total` items into pages of `page_size`.
    #[must_use]
    pub const fn new(total: usize, page_size: NonZeroUsize) -> Self {
        Self { total, page_size }
    }

    /// Number of items being paginated.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Items per page.
    #[must_use]
    pub const fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Number of pages, `ceil(total / page_size)`. Zero when there are no items.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size.get())
    }

    /// Index range of `page` within the item list.
    ///
    /// Pages past the end (and page 0) yield an empty range; the last page
    /// is clipped to `total`.
    #[must_use]
    pub fn range(&self, page: usize) -> Range<usize> {
        if page == 0 {
            return 0..0;
        }
        let size = self.page_size.get();
        let start = (page - 1).saturating_mul(size).min(self.total);
        let end = page.saturating_mul(size).min(self.total);
        start..end
    }

    /// The items of `page` taken from `items`.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T], page: usize) -> &'a [T] {
        items.get(self.range(page)).unwrap_or(&[])
    }

    /// Clamp `page` into `[1, max(1, page_count)]`.
    #[must_use]
    pub fn clamp(&self, page: usize) -> usize {
        page.clamp(1, self.page_count().max(1))
    }
}
