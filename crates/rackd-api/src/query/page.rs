//! Pagination window normalization and page-link math
//!
//! Inputs follow the `per_page` + 1-indexed `page` convention:
//! - `per_page` absent: no pagination, every matching record is returned;
//! - `per_page = 0`: an empty page with the correct total;
//! - `page` absent: defaults to 1.

use serde::{Deserialize, Serialize};

use rackd_common::RackdError;

/// Normalized pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// 1-indexed page number.
    pub page: u64,
    /// Page size; `None` disables pagination.
    pub per_page: Option<u64>,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: None,
        }
    }
}

impl PageWindow {
    /// Parse raw `per_page` / `page` query values.
    pub fn parse(per_page: Option<&str>, page: Option<&str>) -> Result<Self, RackdError> {
        let per_page = per_page
            .map(|raw| {
                raw.parse::<u64>().map_err(|_| {
                    RackdError::Pagination(format!("per_page must be a non-negative integer, got '{}'", raw))
                })
            })
            .transpose()?;

        let page = page
            .map(|raw| {
                let parsed = raw.parse::<u64>().map_err(|_| {
                    RackdError::Pagination(format!("page must be a positive integer, got '{}'", raw))
                })?;
                if parsed == 0 {
                    return Err(RackdError::Pagination("page is 1-indexed, got '0'".to_string()));
                }
                Ok(parsed)
            })
            .transpose()?
            .unwrap_or(1);

        Ok(PageWindow { page, per_page })
    }

    /// Offset of the window into the filtered record set.
    pub fn offset(&self) -> u64 {
        match self.per_page {
            Some(per_page) => (self.page - 1) * per_page,
            None => 0,
        }
    }
}

/// Prev/next/first/last page numbers derived from a page position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageLinks {
    pub prev: Option<u64>,
    pub next: Option<u64>,
    pub first: Option<u64>,
    pub last: Option<u64>,
}

impl PageLinks {
    /// Compute the link set for `page` within `pages_available` total pages.
    ///
    /// `total_count = 0` yields no links at all.
    pub fn compute(page: u64, pages_available: u64, total_count: u64) -> Self {
        if total_count == 0 {
            return Self::default();
        }

        Self {
            prev: (page > 1).then(|| page - 1),
            next: (page < pages_available).then(|| page + 1),
            first: Some(1),
            last: (pages_available > 0).then_some(pages_available),
        }
    }
}
