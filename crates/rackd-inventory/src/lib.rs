//! Domain aggregates, events, and entity services for rackd

pub mod events;
pub mod model;
pub mod service;

pub use events::{BroadcastEventPublisher, DomainEvent, DomainEventKind, EntityKind, EventPublisher};
