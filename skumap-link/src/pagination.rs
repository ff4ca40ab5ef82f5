//! Pagination for table browsing (100 rows/page)

/// Rows per page
pub const PAGE_SIZE: i64 = 100;

/// Page position derived from a row total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    pub total_pages: i64,
    /// Rows to skip before the page starts
    pub offset: i64,
}

/// Clamp `requested_page` into `[1, total_pages]` and compute its offset
///
/// ```
/// use skumap_link::pagination::calculate_pagination;
///
/// let p = calculate_pagination(250, 99);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 200);
/// ```
pub fn calculate_pagination(total_rows: i64, requested_page: i64) -> Pagination {
    let total_pages = (total_rows + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = requested_page.clamp(1, total_pages.max(1));

    Pagination {
        page,
        total_pages,
        offset: (page - 1) * PAGE_SIZE,
    }
}
