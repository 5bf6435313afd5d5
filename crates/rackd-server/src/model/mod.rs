//! Server-side models: configuration, shared state, response helpers

pub mod app_state;
pub mod config;
pub mod constants;
pub mod response;
