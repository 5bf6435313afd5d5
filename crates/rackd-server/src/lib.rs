//! rackd server library
//!
//! Exposes the HTTP layer so integration tests can assemble the actix app
//! the same way `main` does.

pub mod api;
pub mod auth;
pub mod middleware;
pub mod model;
pub mod startup;
