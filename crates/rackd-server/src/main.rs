//! Main entry point for the rackd inventory server.

use std::sync::Arc;

use rackd_inventory::events::{BroadcastEventPublisher, EventPublisher};
use rackd_migration::{Migrator, MigratorTrait};
use rackd_server::{
    model::{app_state::AppState, config::Configuration},
    startup,
};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = Configuration::new();
    let _logging_guard = startup::init_logging(&configuration.logging_config());

    let address = configuration.server_address();
    let port = configuration.server_port();
    let context_path = configuration.server_context_path();

    let database_connection = configuration.database_connection().await?;
    Migrator::up(&database_connection, None).await?;
    info!("database schema is up to date");

    let broadcast_publisher = Arc::new(BroadcastEventPublisher::new(
        configuration.event_queue_size(),
    ));

    // Relay domain events to the log. Delivery is at-most-once with no
    // ordering guarantee; events published with no subscriber are dropped.
    let mut events = broadcast_publisher.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(
                entity = %event.entity,
                entity_id = %event.entity_id,
                kind = ?event.kind,
                "domain event"
            );
        }
    });

    let auth_password_hash = bcrypt::hash(configuration.auth_password(), bcrypt::DEFAULT_COST)?;

    let event_publisher: Arc<dyn EventPublisher> = broadcast_publisher;
    let app_state = Arc::new(AppState {
        configuration,
        database_connection,
        event_publisher,
        auth_password_hash,
    });

    info!("starting rackd server on {}:{}", address, port);
    let server = startup::api_server(app_state, context_path, address, port)?;

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("server error: {}", e);
            }
        }
        _ = startup::shutdown_signal() => {
            info!("shutting down gracefully");
        }
    }

    info!("rackd server shutdown complete");
    Ok(())
}
