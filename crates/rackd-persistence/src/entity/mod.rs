//! `SeaORM` entities for the inventory tables

pub mod application;
pub mod connection_type;
pub mod credential;
pub mod environment;
pub mod operating_system;
pub mod server;
pub mod server_application;
