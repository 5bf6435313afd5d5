// Domain event publication
// Events are collected on an aggregate while it mutates and handed to the
// publisher after a successful persistence write. Delivery is best-effort,
// at-most-once and unordered; a failed publish after a committed write is
// logged and dropped, never rolled back.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Entity kind an event refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Application,
    Server,
    Environment,
    OperatingSystem,
    Credential,
    ConnectionType,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Application => write!(f, "application"),
            EntityKind::Server => write!(f, "server"),
            EntityKind::Environment => write!(f, "environment"),
            EntityKind::OperatingSystem => write!(f, "operating_system"),
            EntityKind::Credential => write!(f, "credential"),
            EntityKind::ConnectionType => write!(f, "connection_type"),
        }
    }
}

/// Type of domain event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "type")]
pub enum DomainEventKind {
    Created,
    FieldChanged { field: String },
    Discarded,
}

/// An immutable record of something that happened to an aggregate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    pub entity: EntityKind,
    pub entity_id: String,
    pub kind: DomainEventKind,
    pub timestamp: i64,
}

impl DomainEvent {
    pub fn created(entity: EntityKind, entity_id: &str) -> Self {
        Self {
            entity,
            entity_id: entity_id.to_string(),
            kind: DomainEventKind::Created,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn field_changed(entity: EntityKind, entity_id: &str, field: &str) -> Self {
        Self {
            entity,
            entity_id: entity_id.to_string(),
            kind: DomainEventKind::FieldChanged {
                field: field.to_string(),
            },
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn discarded(entity: EntityKind, entity_id: &str) -> Self {
        Self {
            entity,
            entity_id: entity_id.to_string(),
            kind: DomainEventKind::Discarded,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Sink for domain events. Constructed once at startup and passed in
/// explicitly wherever events are published.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent);
}

/// Broadcast-channel publisher. Subscribers see events from the moment
/// they subscribe; events sent with no subscriber are dropped.
pub struct BroadcastEventPublisher {
    tx: broadcast::Sender<DomainEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(queue_size: usize) -> Self {
        let (tx, _) = broadcast::channel(queue_size);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

#[async_trait::async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: DomainEvent) {
        debug!(
            entity = %event.entity,
            entity_id = %event.entity_id,
            "publishing domain event"
        );

        if self.tx.send(event).is_err() {
            debug!("no event subscribers, event dropped");
        }
    }
}

/// Publish a drained event batch in order.
pub async fn publish_all(publisher: &dyn EventPublisher, events: Vec<DomainEvent>) {
    for event in events {
        publisher.publish(event).await;
    }
}
