//! Sort expression parsing for list endpoints
//!
//! Sorting arrives as `sort=<field>:<asc|desc>[,<field>:<asc|desc>...]`,
//! applied in list order: earlier entries take precedence on ties. When the
//! same field appears more than once, the first occurrence wins and later
//! duplicates are dropped.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use rackd_common::RackdError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = RackdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(RackdError::Sort(format!(
                "direction must be 'asc' or 'desc', got '{}'",
                s
            ))),
        }
    }
}

/// One ordered (field, direction) entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub field: String,
    pub direction: SortDirection,
}

impl SortDescriptor {
    fn parse_entry(entry: &str) -> Result<Self, RackdError> {
        let (field, direction) = entry.split_once(':').ok_or_else(|| {
            RackdError::Sort(format!(
                "sort entry must have the form <field>:<asc|desc>, got '{}'",
                entry
            ))
        })?;

        if field.is_empty() {
            return Err(RackdError::Sort(format!("empty field in '{}'", entry)));
        }

        Ok(SortDescriptor {
            field: field.to_string(),
            direction: direction.parse()?,
        })
    }
}

/// Parse a comma-separated sort list, deduplicating fields first-wins.
pub fn parse_sort(raw: &str) -> Result<Vec<SortDescriptor>, RackdError> {
    if raw.is_empty() {
        return Ok(vec![]);
    }

    let mut descriptors: Vec<SortDescriptor> = Vec::new();
    for entry in raw.split(',') {
        let descriptor = SortDescriptor::parse_entry(entry)?;
        if !descriptors.iter().any(|d| d.field == descriptor.field) {
            descriptors.push(descriptor);
        }
    }

    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single() {
        let sort = parse_sort("name:asc").unwrap();
        assert_eq!(sort.len(), 1);
        assert_eq!(sort[0].field, "name");
        assert_eq!(sort[0].direction, SortDirection::Asc);
    }

    #[test]
    fn test_parse_preserves_order() {
        let sort = parse_sort("name:asc,version:desc").unwrap();
        assert_eq!(sort[0].field, "name");
        assert_eq!(sort[1].field, "version");
        assert_eq!(sort[1].direction, SortDirection::Desc);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_sort("").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_field_first_wins() {
        let sort = parse_sort("name:asc,name:desc").unwrap();
        assert_eq!(sort.len(), 1);
        assert_eq!(sort[0].direction, SortDirection::Asc);
    }

    #[test]
    fn test_missing_colon_rejected() {
        assert!(matches!(
            parse_sort("name").unwrap_err(),
            RackdError::Sort(_)
        ));
    }

    #[test]
    fn test_bad_direction_rejected() {
        assert!(matches!(
            parse_sort("name:up").unwrap_err(),
            RackdError::Sort(_)
        ));
    }

    #[test]
    fn test_empty_field_rejected() {
        assert!(matches!(
            parse_sort(":asc").unwrap_err(),
            RackdError::Sort(_)
        ));
    }
}
