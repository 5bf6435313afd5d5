//! Database entities and the generic list-query builder for rackd

pub mod entity;
pub mod query;

// Re-export so downstream crates use a single SeaORM version.
pub use sea_orm;
