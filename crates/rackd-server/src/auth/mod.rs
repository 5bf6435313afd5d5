//! Bearer-token authentication
//!
//! Token issuance (login) and validation. Validation itself is also wired
//! into the `Authentication` middleware; handlers never see an
//! unauthenticated request.

pub mod model;
pub mod route;
pub mod service;
