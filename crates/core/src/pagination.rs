//! Page arithmetic for list pages.
//!
//! Product and order lists come back from the API whole (or with a server
//! computed page count) and are sliced here. Pages are numbered from 1.

/// Items per page on the product, category, and back-office lists.
pub const DEFAULT_PER_PAGE: usize = 4;

/// Items per page on the profile's order history.
pub const PROFILE_ORDERS_PER_PAGE: usize = 3;

/// A page position within a list of `total_items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    total_items: usize,
    per_page: usize,
    current: usize,
}

impl Pagination {
    /// Position on `page` (1-based) of a list with `total_items` entries.
    ///
    /// A page of 0 is treated as 1 and a `per_page` of 0 as 1. Pages past
    /// the end are kept as requested and yield empty slices.
    #[must_use]
    pub const fn new(total_items: usize, per_page: usize, page: usize) -> Self {
        Self {
            total_items,
            per_page: if per_page == 0 { 1 } else { per_page },
            current: if page == 0 { 1 } else { page },
        }
    }

    /// Number of pages, `ceil(total_items / per_page)`.
    #[must_use]
    pub const fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.per_page)
    }

    /// The current page number.
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current < self.total_pages()
    }

    /// Page numbers `1..=total_pages`.
    pub fn pages(&self) -> impl Iterator<Item = usize> {
        1..=self.total_pages()
    }

    /// The items shown on the current page: `items[(k-1)*size .. k*size]`,
    /// clamped to the slice.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.current - 1).saturating_mul(self.per_page);
        let end = start.saturating_add(self.per_page).min(items.len());
        items.get(start..end).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(Pagination::new(0, 4, 1).total_pages(), 0);
        assert_eq!(Pagination::new(4, 4, 1).total_pages(), 1);
        assert_eq!(Pagination::new(9, 4, 1).total_pages(), 3);
        assert_eq!(Pagination::new(7, 3, 1).total_pages(), 3);
    }

    #[test]
    fn test_slice_follows_page_window() {
        let items: Vec<u32> = (1..=9).collect();

        assert_eq!(Pagination::new(9, 4, 1).slice(&items), &[1, 2, 3, 4]);
        assert_eq!(Pagination::new(9, 4, 2).slice(&items), &[5, 6, 7, 8]);
        assert_eq!(Pagination::new(9, 4, 3).slice(&items), &[9]);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let items: Vec<u32> = (1..=9).collect();
        let page = Pagination::new(9, 4, 7);

        assert!(page.slice(&items).is_empty());
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_page_zero_means_first_page() {
        let items = ["a", "b", "c"];
        let page = Pagination::new(3, 2, 0);

        assert_eq!(page.current(), 1);
        assert_eq!(page.slice(&items), &["a", "b"]);
        assert!(!page.has_previous());
        assert!(page.has_next());
    }
}
