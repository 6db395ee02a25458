//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub const fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Page size clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Calculates the offset for queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.per_page())
    }

    /// Returns the limit for queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page())
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Number of items in this page.
    pub count: usize,
    /// True when the page is full, so a next page may exist.
    pub has_more: bool,
}

impl<T> PageResponse<T> {
    /// Wraps one page of results fetched with `request`.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest) -> Self {
        let per_page = request.per_page();
        let count = data.len();
        Self {
            data,
            meta: PageMeta {
                page: request.page.max(1),
                per_page,
                count,
                has_more: u64::try_from(count).is_ok_and(|n| n >= u64::from(per_page)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_default() {
        let request = PageRequest::default();
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, 20);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_page_request_offset() {
        assert_eq!(PageRequest::new(2, 20).offset(), 20);
        assert_eq!(PageRequest::new(0, 20).offset(), 0);
    }

    #[test]
    fn test_page_request_limit_is_clamped() {
        assert_eq!(PageRequest::new(1, 500).limit(), 100);
        assert_eq!(PageRequest::new(1, 0).limit(), 1);
    }

    #[test]
    fn test_page_response_full_page_has_more() {
        let response = PageResponse::new(vec![1, 2], PageRequest::new(3, 2));
        assert_eq!(response.meta.page, 3);
        assert_eq!(response.meta.count, 2);
        assert!(response.meta.has_more);
    }

    #[test]
    fn test_page_response_short_page() {
        let response: PageResponse<i32> = PageResponse::new(vec![], PageRequest::new(0, 10));
        assert_eq!(response.meta.page, 1);
        assert!(!response.meta.has_more);
    }
}
