//! Entity services
//!
//! Each service exposes the same five operations over its entity:
//! `find_many`, `find_one`, `add_one`, `update_one`, `discard_one`.
//! Natural-key uniqueness is enforced here with a pre-insert existence
//! query against non-discarded rows; two concurrent creates with the same
//! key can both pass the check, a race inherited from the original design.

pub mod application;
pub mod connection_type;
pub mod credential;
pub mod environment;
pub mod operating_system;
pub mod server;
