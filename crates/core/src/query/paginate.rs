/// Questions per page.
pub const PAGE_SIZE: usize = 50;

/// One window over a sorted result.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'s, T> {
    pub items: &'s [T],
    /// 1-based page actually served, after clamping.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Number of pages needed for `len` items. Zero items means zero pages.
#[must_use]
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Clamp a requested page into `1..=total_pages` (page 1 when there are none).
#[must_use]
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slice out the requested 1-based page. Out-of-range requests clamp.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let total_pages = total_pages(items.len(), page_size);
    let page = clamp_page(page, total_pages);
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    Page {
        items: &items[start..end],
        page,
        total_pages,
        total_items: items.len(),
    }
}
