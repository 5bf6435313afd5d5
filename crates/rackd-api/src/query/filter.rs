//! Filter expression parsing for list endpoints
//!
//! A filter arrives as a query parameter of the form `field=<op>:<value>`.
//! The value is everything after the first colon, so values may themselves
//! contain colons. Commas separate list values for `in` and `btw`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use rackd_common::RackdError;

/// Filter operator for field comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equal to
    Eq,
    /// Greater than
    Gt,
    /// Greater than or equal
    Ge,
    /// Less than
    Lt,
    /// Less than or equal
    Le,
    /// In a comma-separated list of values
    In,
    /// Between two comma-separated values, inclusive
    Btw,
    /// Case-insensitive substring match
    Lk,
}

impl FromStr for FilterOperator {
    type Err = RackdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(FilterOperator::Eq),
            "gt" => Ok(FilterOperator::Gt),
            "ge" => Ok(FilterOperator::Ge),
            "lt" => Ok(FilterOperator::Lt),
            "le" => Ok(FilterOperator::Le),
            "in" => Ok(FilterOperator::In),
            "btw" => Ok(FilterOperator::Btw),
            "lk" => Ok(FilterOperator::Lk),
            _ => Err(RackdError::Filter(format!("unknown operator '{}'", s))),
        }
    }
}

/// A parsed filter predicate descriptor for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterDescriptor {
    /// Parse a `<op>:<value>` string for the given field.
    pub fn parse(field: &str, raw: &str) -> Result<Self, RackdError> {
        let (op, value) = raw.split_once(':').ok_or_else(|| {
            RackdError::Filter(format!(
                "filter on '{}' must have the form <op>:<value>, got '{}'",
                field, raw
            ))
        })?;

        Ok(FilterDescriptor {
            field: field.to_string(),
            operator: op.parse()?,
            value: value.to_string(),
        })
    }

    /// Split the raw value on commas, for `in` and `btw` operators.
    pub fn values(&self) -> Vec<&str> {
        self.value.split(',').collect()
    }
}
