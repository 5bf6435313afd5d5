//! Shared error types and utilities for rackd

pub mod error;
pub mod utils;

pub use error::{AppError, RackdError};
pub use utils::{generate_id, is_valid_name};
