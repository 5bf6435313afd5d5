//! Utility functions for rackd
//!
//! Common helper functions used across the codebase.

use std::sync::LazyLock;

/// Names may contain anything except characters that break query strings
/// and log lines.
static NAME_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[^@#$%^&*]+$").expect("Invalid regex pattern"));

/// Generate a new 32-character entity identifier (UUID v4, simple form).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Validate an entity name.
///
/// # Examples
///
/// ```
/// use rackd_common::is_valid_name;
///
/// assert!(is_valid_name("web-1"));
/// assert!(is_valid_name("Ubuntu 22.04"));
/// assert!(!is_valid_name("bad#name"));
/// assert!(!is_valid_name(""));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}
