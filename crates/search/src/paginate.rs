//! Page arithmetic for listings.

/// Where a requested page actually lands once clamped into range.
///
/// `page` is 1-based. An empty listing has zero pages, in which case `page`
/// is 0 and the window is empty no matter what was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub total_pages: u64,
    pub offset: u64,
    pub limit: u64,
}

impl Pagination {
    /// Clamps `page` into `[1, total_pages]`.
    ///
    /// A `page_size` of zero is treated as one; configuration validation
    /// rejects it earlier, but this arithmetic must never divide by zero.
    pub fn compute(total_items: u64, page: i64, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_items.div_ceil(page_size);
        if total_pages == 0 {
            return Self {
                page: 0,
                total_pages: 0,
                offset: 0,
                limit: 0,
            };
        }
        let page = u64::try_from(page).unwrap_or(0).clamp(1, total_pages);
        Self {
            page,
            total_pages,
            offset: (page - 1) * page_size,
            limit: page_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_pages == 0
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slices an in-memory, already ordered listing.
///
/// ```
/// use shelf_search::paginate;
///
/// let books: Vec<u32> = (1..=10).collect();
/// let (items, total_pages) = paginate(&books, 5, 10);
/// assert_eq!(items, books);
/// assert_eq!(total_pages, 1);
/// ```
pub fn paginate<T: Clone>(items: &[T], page: i64, page_size: u64) -> (Vec<T>, u64) {
    let pagination = Pagination::compute(items.len() as u64, page, page_size);
    let window = items
        .iter()
        .skip(pagination.offset as usize)
        .take(pagination.limit as usize)
        .cloned()
        .collect();
    (window, pagination.total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(0, 0)]
    #[case(0, -3)]
    #[case(0, 42)]
    fn test_empty_listing_has_no_pages(#[case] total: u64, #[case] page: i64) {
        let pagination = Pagination::compute(total, page, 10);
        assert!(pagination.is_empty());
        assert_eq!(pagination.limit, 0);
        assert_eq!(paginate::<u8>(&[], page, 10), (vec![], 0));
    }

    #[rstest]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(25, 10, 3)]
    #[case(7, 1, 7)]
    #[case(100, 33, 4)]
    fn test_total_pages_rounds_up(#[case] total: u64, #[case] page_size: u64, #[case] expected: u64) {
        assert_eq!(Pagination::compute(total, 1, page_size).total_pages, expected);
    }

    #[test]
    fn test_requested_page_is_clamped() {
        for total in 1..=40 {
            for page_size in 1..=12 {
                for page in -3..=10 {
                    let pagination = Pagination::compute(total, page, page_size);
                    assert!(
                        (1..=pagination.total_pages).contains(&pagination.page),
                        "{total} items, size {page_size}, page {page} landed on {}",
                        pagination.page
                    );
                    assert!(pagination.offset < total);
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_page_lands_on_last() {
        let books: Vec<u32> = (1..=25).collect();
        let (items, total_pages) = paginate(&books, 99, 10);
        assert_eq!(total_pages, 3);
        assert_eq!(items, (21..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_page_request_beyond_range() {
        let books: Vec<u32> = (1..=10).collect();
        let (items, total_pages) = paginate(&books, 5, 10);
        assert_eq!(items, books);
        assert_eq!(total_pages, 1);
    }

    #[test]
    fn test_navigation_flags() {
        let first = Pagination::compute(25, 1, 10);
        assert!(!first.has_previous());
        assert!(first.has_next());
        let last = Pagination::compute(25, 3, 10);
        assert!(last.has_previous());
        assert!(!last.has_next());
        assert_eq!(last.offset, 20);
    }

    #[test]
    fn test_zero_page_size_does_not_panic() {
        let pagination = Pagination::compute(3, 2, 0);
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(pagination.page, 2);
    }
}
