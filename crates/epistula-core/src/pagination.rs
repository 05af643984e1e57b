/// Position within a paged list. Pages are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    current_page: u32,
    total_pages: u32,
}

impl Pagination {
    pub fn new(current_page: u32, total_pages: u32) -> Self {
        Self {
            current_page,
            total_pages,
        }
    }

    /// Number of pages needed for `item_count` items.
    pub fn total_pages_for(item_count: usize, per_page: usize) -> u32 {
        if per_page == 0 {
            return 0;
        }
        u32::try_from(item_count.div_ceil(per_page)).unwrap_or(u32::MAX)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// A single page (or none) needs no controls.
    pub fn is_visible(&self) -> bool {
        1 < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        1 < self.current_page
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Page requested by "previous"; never below 1.
    pub fn previous_page(&self) -> u32 {
        self.current_page.saturating_sub(1).max(1)
    }

    /// Page requested by "next"; never above the last page.
    pub fn next_page(&self) -> u32 {
        self.current_page
            .saturating_add(1)
            .min(self.total_pages)
            .max(1)
    }
}

/// Cut one page out of `items`.
///
/// Out-of-range page numbers are clamped to the first or last page.
pub fn paginate<T>(items: &[T], requested_page: u32, per_page: usize) -> (&[T], Pagination) {
    let total_pages = Pagination::total_pages_for(items.len(), per_page);
    let current_page = requested_page.clamp(1, total_pages.max(1));

    let start = (current_page as usize - 1).saturating_mul(per_page);
    let end = start.saturating_add(per_page).min(items.len());
    let page = items.get(start..end).unwrap_or_default();

    (page, Pagination::new(current_page, total_pages))
}
