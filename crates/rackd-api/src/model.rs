//! Shared wire-format models

use serde::{Deserialize, Serialize};

use crate::query::PageWindow;

/// Generic pagination wrapper for API responses
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_count: u64,
    pub page_number: u64,
    pub pages_available: u64,
    pub page_items: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            total_count: 0,
            page_number: 1,
            pages_available: 0,
            page_items: vec![],
        }
    }
}

impl<T> Page<T> {
    pub fn new(total_count: u64, page_number: u64, page_size: u64, page_items: Vec<T>) -> Self {
        Self {
            total_count,
            page_number,
            pages_available: if page_size > 0 {
                (total_count as f64 / page_size as f64).ceil() as u64
            } else {
                0
            },
            page_items,
        }
    }

    /// A page holding the whole result set (no pagination requested).
    pub fn unpaged(total_count: u64, page_items: Vec<T>) -> Self {
        Self {
            total_count,
            page_number: 1,
            pages_available: if total_count > 0 { 1 } else { 0 },
            page_items,
        }
    }

    /// Build a page from a normalized window.
    pub fn with_window(total_count: u64, window: &PageWindow, page_items: Vec<T>) -> Self {
        match window.per_page {
            None => Self::unpaged(total_count, page_items),
            Some(per_page) => Self::new(total_count, window.page, per_page, page_items),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total_count: self.total_count,
            page_number: self.page_number,
            pages_available: self.pages_available,
            page_items: self.page_items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new_rounds_up() {
        let page = Page::<String>::new(101, 1, 10, vec![]);
        assert_eq!(page.pages_available, 11);
    }

    #[test]
    fn test_page_new_zero_size() {
        let page = Page::<String>::new(100, 1, 0, vec![]);
        assert_eq!(page.total_count, 100);
        assert_eq!(page.pages_available, 0);
        assert!(page.page_items.is_empty());
    }

    #[test]
    fn test_page_unpaged() {
        let page = Page::unpaged(3, vec![1, 2, 3]);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.pages_available, 1);

        let empty = Page::<u32>::unpaged(0, vec![]);
        assert_eq!(empty.pages_available, 0);
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let page = Page::new(5, 2, 2, vec![1, 2]);
        let mapped = page.map(|v| v.to_string());
        assert_eq!(mapped.total_count, 5);
        assert_eq!(mapped.page_number, 2);
        assert_eq!(mapped.pages_available, 3);
        assert_eq!(mapped.page_items, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = Page::new(1, 1, 10, vec!["a"]);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("totalCount").is_some());
        assert!(json.get("pageNumber").is_some());
        assert!(json.get("pagesAvailable").is_some());
        assert!(json.get("pageItems").is_some());
    }
}
