//! Stateless page slicing.

use serde::Serialize;

/// Rows per page in the admin listing.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Page numbers below 1 become 1; a zero page size becomes 1.
    #[must_use]
    pub fn new(page: i64, page_size: u32) -> Self {
        let page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        Self {
            page,
            page_size: page_size.max(1),
        }
    }

    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn page_size(self) -> u32 {
        self.page_size
    }

    /// Rows skipped before this page.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus the unsliced count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    /// Number of pages, at least 1.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Assemble a page from an already-sliced result.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let pages = total.div_ceil(request.page_size as u64);
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages: if pages == 0 { 1 } else { pages },
        }
    }
}

/// Slice an already filtered and sorted collection.
///
/// A page past the end is empty, not an error.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let slice: Vec<T> = items
        .iter()
        .skip(offset)
        .take(request.page_size as usize)
        .cloned()
        .collect();
    Page::new(slice, items.len() as u64, request)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_below_one_is_clamped() {
        assert_eq!(PageRequest::new(0, 10).page(), 1);
        assert_eq!(PageRequest::new(-4, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_paginate_slices_and_counts() {
        let items: Vec<u32> = (1..=25).collect();

        let second = paginate(&items, PageRequest::new(2, 10));
        assert_eq!(second.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(second.total, 25);
        assert_eq!(second.total_pages, 3);

        let last = paginate(&items, PageRequest::new(3, 10));
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items = vec!["a", "b"];
        let page = paginate(&items, PageRequest::new(9, 10));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
        assert_eq!(page.page, 9);
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let page = paginate::<u8>(&[], PageRequest::default());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_page_count_is_serialized() {
        let items: Vec<u32> = (1..=11).collect();
        let json = serde_json::to_value(paginate(&items, PageRequest::new(1, 10))).unwrap();
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["pageSize"], 10);
    }
}
