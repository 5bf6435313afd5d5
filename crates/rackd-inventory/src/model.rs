//! Domain aggregates and wire-format DTOs
//!
//! Aggregates are created through a factory that stamps the identifier and
//! records a `Created` event. Setters detect actual change, reject mutation
//! once the aggregate is discarded, and record one `FieldChanged` event per
//! changed field. Events accumulate on the aggregate until the service
//! drains them with `take_events()` after a successful write.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use rackd_common::{RackdError, generate_id};
use rackd_persistence::entity;

use crate::events::{DomainEvent, EntityKind};

/// Server operational status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Running,
    Stopped,
    Error,
    Unknown,
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerStatus::Running => write!(f, "running"),
            ServerStatus::Stopped => write!(f, "stopped"),
            ServerStatus::Error => write!(f, "error"),
            ServerStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for ServerStatus {
    type Err = RackdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(ServerStatus::Running),
            "stopped" => Ok(ServerStatus::Stopped),
            "error" => Ok(ServerStatus::Error),
            "unknown" => Ok(ServerStatus::Unknown),
            _ => Err(RackdError::IllegalArgument(format!(
                "invalid server status '{}'",
                s
            ))),
        }
    }
}

macro_rules! field_setter {
    ($setter:ident, $field:ident: $ty:ty, $entity:expr) => {
        pub fn $setter(&mut self, value: $ty) -> Result<bool, RackdError> {
            self.ensure_active()?;
            if self.$field == value {
                return Ok(false);
            }
            self.$field = value;
            self.events.push(DomainEvent::field_changed(
                $entity,
                &self.id,
                stringify!($field),
            ));
            Ok(true)
        }
    };
}

macro_rules! lifecycle {
    ($entity:expr) => {
        fn ensure_active(&self) -> Result<(), RackdError> {
            if self.discarded {
                return Err(RackdError::EntityDiscarded(
                    $entity.to_string(),
                    self.id.clone(),
                ));
            }
            Ok(())
        }

        /// Flip to the terminal Discarded state.
        pub fn discard(&mut self) -> Result<(), RackdError> {
            self.ensure_active()?;
            self.discarded = true;
            self.events.push(DomainEvent::discarded($entity, &self.id));
            Ok(())
        }

        /// Drain the events recorded since creation or the last drain.
        pub fn take_events(&mut self) -> Vec<DomainEvent> {
            std::mem::take(&mut self.events)
        }
    };
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Application {
    pub id: String,
    pub name: String,
    pub version: String,
    pub architect: String,
    pub discarded: bool,
    events: Vec<DomainEvent>,
}

impl Application {
    pub fn create(name: String, version: String, architect: String) -> Self {
        let id = generate_id();
        let events = vec![DomainEvent::created(EntityKind::Application, &id)];
        Self {
            id,
            name,
            version,
            architect,
            discarded: false,
            events,
        }
    }

    lifecycle!(EntityKind::Application);
    field_setter!(set_name, name: String, EntityKind::Application);
    field_setter!(set_version, version: String, EntityKind::Application);
    field_setter!(set_architect, architect: String, EntityKind::Application);
}

impl From<entity::application::Model> for Application {
    fn from(model: entity::application::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            version: model.version,
            architect: model.architect,
            discarded: model.discarded,
            events: vec![],
        }
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Environment {
    pub id: String,
    pub name: String,
    pub discarded: bool,
    events: Vec<DomainEvent>,
}

impl Environment {
    pub fn create(name: String) -> Self {
        let id = generate_id();
        let events = vec![DomainEvent::created(EntityKind::Environment, &id)];
        Self {
            id,
            name,
            discarded: false,
            events,
        }
    }

    lifecycle!(EntityKind::Environment);
    field_setter!(set_name, name: String, EntityKind::Environment);
}

impl From<entity::environment::Model> for Environment {
    fn from(model: entity::environment::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            discarded: model.discarded,
            events: vec![],
        }
    }
}

// ---------------------------------------------------------------------------
// OperatingSystem
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct OperatingSystem {
    pub id: String,
    pub name: String,
    pub version: String,
    pub architect: String,
    pub discarded: bool,
    events: Vec<DomainEvent>,
}

impl OperatingSystem {
    pub fn create(name: String, version: String, architect: String) -> Self {
        let id = generate_id();
        let events = vec![DomainEvent::created(EntityKind::OperatingSystem, &id)];
        Self {
            id,
            name,
            version,
            architect,
            discarded: false,
            events,
        }
    }

    lifecycle!(EntityKind::OperatingSystem);
    field_setter!(set_name, name: String, EntityKind::OperatingSystem);
    field_setter!(set_version, version: String, EntityKind::OperatingSystem);
    field_setter!(set_architect, architect: String, EntityKind::OperatingSystem);
}

impl From<entity::operating_system::Model> for OperatingSystem {
    fn from(model: entity::operating_system::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            version: model.version,
            architect: model.architect,
            discarded: model.discarded,
            events: vec![],
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionType
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ConnectionType {
    pub id: String,
    pub name: String,
    pub discarded: bool,
    events: Vec<DomainEvent>,
}

impl ConnectionType {
    pub fn create(name: String) -> Self {
        let id = generate_id();
        let events = vec![DomainEvent::created(EntityKind::ConnectionType, &id)];
        Self {
            id,
            name,
            discarded: false,
            events,
        }
    }

    lifecycle!(EntityKind::ConnectionType);
    field_setter!(set_name, name: String, EntityKind::ConnectionType);
}

impl From<entity::connection_type::Model> for ConnectionType {
    fn from(model: entity::connection_type::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            discarded: model.discarded,
            events: vec![],
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub cpu: String,
    pub ram: String,
    pub hdd: String,
    pub status: Option<String>,
    pub environment_id: String,
    pub operating_system_id: String,
    pub discarded: bool,
    events: Vec<DomainEvent>,
}

impl Server {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        name: String,
        cpu: String,
        ram: String,
        hdd: String,
        status: Option<String>,
        environment_id: String,
        operating_system_id: String,
    ) -> Self {
        let id = generate_id();
        let events = vec![DomainEvent::created(EntityKind::Server, &id)];
        Self {
            id,
            name,
            cpu,
            ram,
            hdd,
            status,
            environment_id,
            operating_system_id,
            discarded: false,
            events,
        }
    }

    lifecycle!(EntityKind::Server);
    field_setter!(set_name, name: String, EntityKind::Server);
    field_setter!(set_cpu, cpu: String, EntityKind::Server);
    field_setter!(set_ram, ram: String, EntityKind::Server);
    field_setter!(set_hdd, hdd: String, EntityKind::Server);
    field_setter!(set_status, status: Option<String>, EntityKind::Server);
    field_setter!(set_environment_id, environment_id: String, EntityKind::Server);
    field_setter!(
        set_operating_system_id,
        operating_system_id: String,
        EntityKind::Server
    );

    /// Record a change of the application association set.
    pub fn replace_applications(&mut self) -> Result<(), RackdError> {
        self.ensure_active()?;
        self.events.push(DomainEvent::field_changed(
            EntityKind::Server,
            &self.id,
            "applications",
        ));
        Ok(())
    }
}

impl From<entity::server::Model> for Server {
    fn from(model: entity::server::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            cpu: model.cpu,
            ram: model.ram,
            hdd: model.hdd,
            status: model.status,
            environment_id: model.environment_id,
            operating_system_id: model.operating_system_id,
            discarded: model.discarded,
            events: vec![],
        }
    }
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Credential {
    pub id: String,
    pub server_id: String,
    pub connection_type_id: String,
    pub username: String,
    pub password: String,
    pub local_ip: Option<String>,
    pub local_port: Option<i32>,
    pub public_ip: Option<String>,
    pub public_port: Option<i32>,
    pub discarded: bool,
    events: Vec<DomainEvent>,
}

impl Credential {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        server_id: String,
        connection_type_id: String,
        username: String,
        password: String,
        local_ip: Option<String>,
        local_port: Option<i32>,
        public_ip: Option<String>,
        public_port: Option<i32>,
    ) -> Self {
        let id = generate_id();
        let events = vec![DomainEvent::created(EntityKind::Credential, &id)];
        Self {
            id,
            server_id,
            connection_type_id,
            username,
            password,
            local_ip,
            local_port,
            public_ip,
            public_port,
            discarded: false,
            events,
        }
    }

    lifecycle!(EntityKind::Credential);
    field_setter!(
        set_connection_type_id,
        connection_type_id: String,
        EntityKind::Credential
    );
    field_setter!(set_username, username: String, EntityKind::Credential);
    field_setter!(set_password, password: String, EntityKind::Credential);
    field_setter!(set_local_ip, local_ip: Option<String>, EntityKind::Credential);
    field_setter!(set_local_port, local_port: Option<i32>, EntityKind::Credential);
    field_setter!(set_public_ip, public_ip: Option<String>, EntityKind::Credential);
    field_setter!(
        set_public_port,
        public_port: Option<i32>,
        EntityKind::Credential
    );
}

impl From<entity::credential::Model> for Credential {
    fn from(model: entity::credential::Model) -> Self {
        Self {
            id: model.id,
            server_id: model.server_id,
            connection_type_id: model.connection_type_id,
            username: model.username,
            password: model.password,
            local_ip: model.local_ip,
            local_port: model.local_port,
            public_ip: model.public_ip,
            public_port: model.public_port,
            discarded: model.discarded,
            events: vec![],
        }
    }
}

// ---------------------------------------------------------------------------
// Read DTOs
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDto {
    pub id: String,
    pub name: String,
    pub version: String,
    pub architect: String,
    pub discarded: bool,
    pub gmt_create: NaiveDateTime,
    pub gmt_modified: NaiveDateTime,
}

impl From<entity::application::Model> for ApplicationDto {
    fn from(model: entity::application::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            version: model.version,
            architect: model.architect,
            discarded: model.discarded,
            gmt_create: model.gmt_create,
            gmt_modified: model.gmt_modified,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentDto {
    pub id: String,
    pub name: String,
    pub discarded: bool,
    pub gmt_create: NaiveDateTime,
    pub gmt_modified: NaiveDateTime,
}

impl From<entity::environment::Model> for EnvironmentDto {
    fn from(model: entity::environment::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            discarded: model.discarded,
            gmt_create: model.gmt_create,
            gmt_modified: model.gmt_modified,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingSystemDto {
    pub id: String,
    pub name: String,
    pub version: String,
    pub architect: String,
    pub discarded: bool,
    pub gmt_create: NaiveDateTime,
    pub gmt_modified: NaiveDateTime,
}

impl From<entity::operating_system::Model> for OperatingSystemDto {
    fn from(model: entity::operating_system::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            version: model.version,
            architect: model.architect,
            discarded: model.discarded,
            gmt_create: model.gmt_create,
            gmt_modified: model.gmt_modified,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTypeDto {
    pub id: String,
    pub name: String,
    pub discarded: bool,
    pub gmt_create: NaiveDateTime,
    pub gmt_modified: NaiveDateTime,
}

impl From<entity::connection_type::Model> for ConnectionTypeDto {
    fn from(model: entity::connection_type::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            discarded: model.discarded,
            gmt_create: model.gmt_create,
            gmt_modified: model.gmt_modified,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDto {
    pub id: String,
    pub server_id: String,
    pub connection_type_id: String,
    pub username: String,
    pub password: String,
    pub local_ip: Option<String>,
    pub local_port: Option<i32>,
    pub public_ip: Option<String>,
    pub public_port: Option<i32>,
    pub discarded: bool,
    pub gmt_create: NaiveDateTime,
    pub gmt_modified: NaiveDateTime,
}

impl From<entity::credential::Model> for CredentialDto {
    fn from(model: entity::credential::Model) -> Self {
        Self {
            id: model.id,
            server_id: model.server_id,
            connection_type_id: model.connection_type_id,
            username: model.username,
            password: model.password,
            local_ip: model.local_ip,
            local_port: model.local_port,
            public_ip: model.public_ip,
            public_port: model.public_port,
            discarded: model.discarded,
            gmt_create: model.gmt_create,
            gmt_modified: model.gmt_modified,
        }
    }
}

/// One application installed on a server, with the edge attributes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerApplicationDto {
    pub application_id: String,
    pub install_dir: String,
    pub log_dir: String,
}

impl From<entity::server_application::Model> for ServerApplicationDto {
    fn from(model: entity::server_application::Model) -> Self {
        Self {
            application_id: model.application_id,
            install_dir: model.install_dir,
            log_dir: model.log_dir,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDto {
    pub id: String,
    pub name: String,
    pub cpu: String,
    pub ram: String,
    pub hdd: String,
    pub status: Option<String>,
    pub environment_id: String,
    pub operating_system_id: String,
    pub discarded: bool,
    pub gmt_create: NaiveDateTime,
    pub gmt_modified: NaiveDateTime,
    /// Loaded only when requested (or when no field selection is given).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<CredentialDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applications: Option<Vec<ServerApplicationDto>>,
}

impl From<entity::server::Model> for ServerDto {
    fn from(model: entity::server::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            cpu: model.cpu,
            ram: model.ram,
            hdd: model.hdd,
            status: model.status,
            environment_id: model.environment_id,
            operating_system_id: model.operating_system_id,
            discarded: model.discarded,
            gmt_create: model.gmt_create,
            gmt_modified: model.gmt_modified,
            credentials: None,
            applications: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Write payloads
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationCreate {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub version: String,
    #[validate(length(min = 1))]
    pub architect: String,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationUpdate {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub version: Option<String>,
    #[validate(length(min = 1))]
    pub architect: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentCreate {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentUpdate {
    #[validate(length(min = 1))]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OperatingSystemCreate {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub version: String,
    #[validate(length(min = 1))]
    pub architect: String,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OperatingSystemUpdate {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub version: Option<String>,
    #[validate(length(min = 1))]
    pub architect: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTypeCreate {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTypeUpdate {
    #[validate(length(min = 1))]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServerApplicationInput {
    #[validate(length(min = 1))]
    pub application_id: String,
    pub install_dir: String,
    pub log_dir: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServerCreate {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub cpu: String,
    #[validate(length(min = 1))]
    pub ram: String,
    #[validate(length(min = 1))]
    pub hdd: String,
    pub status: Option<String>,
    #[validate(length(min = 1))]
    pub environment_id: String,
    #[validate(length(min = 1))]
    pub operating_system_id: String,
    #[validate(nested)]
    pub applications: Option<Vec<ServerApplicationInput>>,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServerUpdate {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub cpu: Option<String>,
    #[validate(length(min = 1))]
    pub ram: Option<String>,
    #[validate(length(min = 1))]
    pub hdd: Option<String>,
    pub status: Option<String>,
    #[validate(length(min = 1))]
    pub environment_id: Option<String>,
    #[validate(length(min = 1))]
    pub operating_system_id: Option<String>,
    #[validate(nested)]
    pub applications: Option<Vec<ServerApplicationInput>>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CredentialCreate {
    #[validate(length(min = 1))]
    pub server_id: String,
    #[validate(length(min = 1))]
    pub connection_type_id: String,
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub local_ip: Option<String>,
    pub local_port: Option<i32>,
    pub public_ip: Option<String>,
    pub public_port: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CredentialUpdate {
    #[validate(length(min = 1))]
    pub connection_type_id: Option<String>,
    #[validate(length(min = 1))]
    pub username: Option<String>,
    #[validate(length(min = 1))]
    pub password: Option<String>,
    pub local_ip: Option<String>,
    pub local_port: Option<i32>,
    pub public_ip: Option<String>,
    pub public_port: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DomainEventKind;

    #[test]
    fn test_create_stamps_id_and_event() {
        let mut app = Application::create(
            "nginx".to_string(),
            "1.27".to_string(),
            "x86_64".to_string(),
        );
        assert_eq!(app.id.len(), 32);
        assert!(!app.discarded);

        let events = app.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, DomainEventKind::Created);
        assert_eq!(events[0].entity_id, app.id);
    }

    #[test]
    fn test_setter_records_event_only_on_change() {
        let mut app = Application::create("a".to_string(), "1".to_string(), "x".to_string());
        app.take_events();

        assert!(!app.set_name("a".to_string()).unwrap());
        assert!(app.take_events().is_empty());

        assert!(app.set_name("b".to_string()).unwrap());
        let events = app.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            DomainEventKind::FieldChanged {
                field: "name".to_string()
            }
        );
    }

    #[test]
    fn test_discard_is_terminal() {
        let mut env = Environment::create("prod".to_string());
        env.take_events();

        env.discard().unwrap();
        assert!(env.discarded);
        let events = env.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, DomainEventKind::Discarded);

        assert!(matches!(
            env.set_name("staging".to_string()).unwrap_err(),
            RackdError::EntityDiscarded(_, _)
        ));
        assert!(matches!(
            env.discard().unwrap_err(),
            RackdError::EntityDiscarded(_, _)
        ));
    }

    #[test]
    fn test_server_status_round_trip() {
        for status in [
            ServerStatus::Running,
            ServerStatus::Stopped,
            ServerStatus::Error,
            ServerStatus::Unknown,
        ] {
            assert_eq!(status.to_string().parse::<ServerStatus>().unwrap(), status);
        }
        assert!("online".parse::<ServerStatus>().is_err());
    }

    #[test]
    fn test_server_dto_omits_unloaded_relations() {
        let mut dto = ServerDto {
            id: "s1".to_string(),
            name: "web-1".to_string(),
            cpu: "4".to_string(),
            ram: "16GB".to_string(),
            hdd: "100GB".to_string(),
            status: None,
            environment_id: "e1".to_string(),
            operating_system_id: "o1".to_string(),
            discarded: false,
            gmt_create: chrono::Utc::now().naive_utc(),
            gmt_modified: chrono::Utc::now().naive_utc(),
            credentials: None,
            applications: None,
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("credentials").is_none());

        dto.credentials = Some(vec![]);
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("credentials").is_some());
    }
}
