//! Actix middleware

pub mod auth;
