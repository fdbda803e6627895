//! Page slicing for list results

use serde::Serialize;

/// One page of a list together with its position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// An empty first page
    pub fn empty(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
            total: 0,
            total_pages: 0,
            has_next: false,
            has_prev: false,
        }
    }
}

/// Slices page `page` of `items`
///
/// The page number is clamped into `1..=total_pages` (page 1 for an empty list), and a
/// zero page size is treated as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(page_size);

    if total == 0 {
        return Page::empty(page_size);
    }

    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);

    Page {
        items: items[start..end].to_vec(),
        page,
        page_size,
        total,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    }
}
