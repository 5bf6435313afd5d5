//! Wire-format models and the list-query contract for rackd
//!
//! Every collection endpoint in the system accepts the same query surface:
//! `field=<op>:<value>` filters, a `sort=<field>:<asc|desc>[,...]` ordering
//! list, `per_page`/`page` pagination, and an optional `fields=` selection.
//! This crate owns the parsing of that surface into typed descriptors.

pub mod model;
pub mod query;

pub use model::Page;
pub use query::{
    FilterDescriptor, FilterOperator, ListRequest, PageLinks, PageWindow, SortDescriptor,
    SortDirection,
};
