//! Shared application state

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use rackd_inventory::events::EventPublisher;

use super::config::Configuration;

/// State shared across all request handlers.
///
/// The event publisher is constructed once in `main` and passed in here;
/// nothing in the system reaches for a process-wide singleton.
pub struct AppState {
    pub configuration: Configuration,
    pub database_connection: DatabaseConnection,
    pub event_publisher: Arc<dyn EventPublisher>,
    /// bcrypt hash of the configured console password, computed at startup.
    pub auth_password_hash: String,
}
