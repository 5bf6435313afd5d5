//! List-endpoint query contract
//!
//! Splits a raw query string into the four parts every collection endpoint
//! understands: filters, sort, pagination window, and field selection.

mod filter;
mod page;
mod sort;

use std::collections::BTreeMap;

pub use filter::{FilterDescriptor, FilterOperator};
pub use page::{PageLinks, PageWindow};
pub use sort::{SortDescriptor, SortDirection, parse_sort};

use rackd_common::RackdError;

/// Reserved query parameters that are never treated as filters.
const PARAM_PER_PAGE: &str = "per_page";
const PARAM_PAGE: &str = "page";
const PARAM_SORT: &str = "sort";
const PARAM_FIELDS: &str = "fields";
const PARAM_ACCESS_TOKEN: &str = "accessToken";

/// Fully parsed list request.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub filters: Vec<FilterDescriptor>,
    pub sort: Vec<SortDescriptor>,
    pub window: PageWindow,
    /// Requested field names; empty means "all fields, all relations".
    pub fields: Vec<String>,
}

impl ListRequest {
    /// Parse decoded query pairs. When the same filter field appears more
    /// than once, the last occurrence wins (map semantics).
    pub fn parse(pairs: &[(String, String)]) -> Result<Self, RackdError> {
        let mut per_page = None;
        let mut page = None;
        let mut sort_raw = "";
        let mut fields_raw = "";
        let mut filter_params: BTreeMap<&str, &str> = BTreeMap::new();

        for (key, value) in pairs {
            match key.as_str() {
                PARAM_PER_PAGE => per_page = Some(value.as_str()),
                PARAM_PAGE => page = Some(value.as_str()),
                PARAM_SORT => sort_raw = value.as_str(),
                PARAM_FIELDS => fields_raw = value.as_str(),
                PARAM_ACCESS_TOKEN => {}
                field => {
                    filter_params.insert(field, value.as_str());
                }
            }
        }

        let filters = filter_params
            .into_iter()
            .map(|(field, raw)| FilterDescriptor::parse(field, raw))
            .collect::<Result<Vec<_>, _>>()?;

        let fields = if fields_raw.is_empty() {
            vec![]
        } else {
            fields_raw.split(',').map(|f| f.trim().to_string()).collect()
        };

        Ok(ListRequest {
            filters,
            sort: parse_sort(sort_raw)?,
            window: PageWindow::parse(per_page, page)?,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_full_request() {
        let request = ListRequest::parse(&pairs(&[
            ("per_page", "20"),
            ("page", "2"),
            ("sort", "name:asc"),
            ("name", "lk:web"),
            ("cpu", "btw:2,8"),
        ]))
        .unwrap();

        assert_eq!(request.window.page, 2);
        assert_eq!(request.window.per_page, Some(20));
        assert_eq!(request.sort.len(), 1);
        assert_eq!(request.filters.len(), 2);
        assert!(request.fields.is_empty());
    }

    #[test]
    fn test_parse_fields_selection() {
        let request = ListRequest::parse(&pairs(&[("fields", "name,version")])).unwrap();
        assert_eq!(request.fields, vec!["name", "version"]);
    }

    #[test]
    fn test_access_token_is_not_a_filter() {
        let request = ListRequest::parse(&pairs(&[("accessToken", "abc")])).unwrap();
        assert!(request.filters.is_empty());
    }

    #[test]
    fn test_duplicate_filter_field_last_wins() {
        let request =
            ListRequest::parse(&pairs(&[("name", "eq:a"), ("name", "eq:b")])).unwrap();
        assert_eq!(request.filters.len(), 1);
        assert_eq!(request.filters[0].value, "b");
    }

    #[test]
    fn test_bad_parts_reject_whole_request() {
        assert!(matches!(
            ListRequest::parse(&pairs(&[("name", "zz:a")])).unwrap_err(),
            RackdError::Filter(_)
        ));
        assert!(matches!(
            ListRequest::parse(&pairs(&[("sort", "name")])).unwrap_err(),
            RackdError::Sort(_)
        ));
        assert!(matches!(
            ListRequest::parse(&pairs(&[("page", "zero")])).unwrap_err(),
            RackdError::Pagination(_)
        ));
    }
}
