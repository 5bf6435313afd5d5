//! Configuration management for the rackd server
//!
//! Configuration is layered: `conf/application.yml` (when present), then
//! `RACKD_*` environment variables, then command line overrides.

use clap::Parser;
use config::{Config, Environment};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::startup::LoggingConfig;

use super::constants::{
    AUTH_PASSWORD_PROPERTY, AUTH_SECRET_KEY_PROPERTY, AUTH_TOKEN_EXPIRE_PROPERTY,
    AUTH_USERNAME_PROPERTY, DB_MAX_CONNECTIONS_PROPERTY, DB_URL_PROPERTY,
    DEFAULT_AUTH_PASSWORD, DEFAULT_AUTH_USERNAME, DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_DB_URL,
    DEFAULT_EVENT_QUEUE_SIZE, DEFAULT_LOG_LEVEL, DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_PORT,
    DEFAULT_TOKEN_EXPIRE_SECONDS, DEFAULT_TOKEN_SECRET_KEY, EVENT_QUEUE_SIZE_PROPERTY,
    LOG_DIR_PROPERTY, LOG_LEVEL_PROPERTY, SERVER_ADDRESS_PROPERTY, SERVER_CONTEXT_PATH_PROPERTY,
    SERVER_PORT_PROPERTY,
};

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command()]
struct Cli {
    #[arg(short = 'a', long = "address")]
    address: Option<String>,
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
    #[arg(long = "context-path")]
    context_path: Option<String>,
    #[arg(long = "db-url", env = "DATABASE_URL")]
    database_url: Option<String>,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Self {
        let args = Cli::parse();
        let mut config_builder = Config::builder()
            .add_source(
                Environment::with_prefix("rackd")
                    .separator(".")
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("conf/application.yml").required(false));

        if let Some(v) = args.address {
            config_builder = config_builder
                .set_override(SERVER_ADDRESS_PROPERTY, v)
                .expect("Failed to set address override");
        }
        if let Some(v) = args.port {
            config_builder = config_builder
                .set_override(SERVER_PORT_PROPERTY, i64::from(v))
                .expect("Failed to set port override");
        }
        if let Some(v) = args.context_path {
            config_builder = config_builder
                .set_override(SERVER_CONTEXT_PATH_PROPERTY, v)
                .expect("Failed to set context path override");
        }
        if let Some(v) = args.database_url {
            config_builder = config_builder
                .set_override(DB_URL_PROPERTY, v)
                .expect("Failed to set database URL override");
        }

        let app_config = config_builder
            .build()
            .expect("Failed to build configuration");

        Configuration { config: app_config }
    }

    pub fn server_address(&self) -> String {
        self.config
            .get_string(SERVER_ADDRESS_PROPERTY)
            .unwrap_or(DEFAULT_SERVER_ADDRESS.to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int(SERVER_PORT_PROPERTY)
            .unwrap_or(DEFAULT_SERVER_PORT.into()) as u16
    }

    pub fn server_context_path(&self) -> String {
        self.config
            .get_string(SERVER_CONTEXT_PATH_PROPERTY)
            .unwrap_or_default()
    }

    pub fn database_url(&self) -> String {
        self.config
            .get_string(DB_URL_PROPERTY)
            .unwrap_or(DEFAULT_DB_URL.to_string())
    }

    pub fn database_max_connections(&self) -> u32 {
        self.config
            .get_int(DB_MAX_CONNECTIONS_PROPERTY)
            .map(|v| v as u32)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub async fn database_connection(&self) -> Result<DatabaseConnection, DbErr> {
        let mut options = ConnectOptions::new(self.database_url());
        options
            .max_connections(self.database_max_connections())
            .sqlx_logging(false);

        Database::connect(options).await
    }

    pub fn token_secret_key(&self) -> String {
        self.config
            .get_string(AUTH_SECRET_KEY_PROPERTY)
            .unwrap_or(DEFAULT_TOKEN_SECRET_KEY.to_string())
    }

    pub fn token_expire_seconds(&self) -> i64 {
        self.config
            .get_int(AUTH_TOKEN_EXPIRE_PROPERTY)
            .unwrap_or(DEFAULT_TOKEN_EXPIRE_SECONDS)
    }

    pub fn auth_username(&self) -> String {
        self.config
            .get_string(AUTH_USERNAME_PROPERTY)
            .unwrap_or(DEFAULT_AUTH_USERNAME.to_string())
    }

    pub fn auth_password(&self) -> String {
        self.config
            .get_string(AUTH_PASSWORD_PROPERTY)
            .unwrap_or(DEFAULT_AUTH_PASSWORD.to_string())
    }

    pub fn event_queue_size(&self) -> usize {
        self.config
            .get_int(EVENT_QUEUE_SIZE_PROPERTY)
            .map(|v| v as usize)
            .unwrap_or(DEFAULT_EVENT_QUEUE_SIZE)
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            directory: self.config.get_string(LOG_DIR_PROPERTY).ok(),
            level: self
                .config
                .get_string(LOG_LEVEL_PROPERTY)
                .unwrap_or(DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_values() {
        let configuration = Configuration::default();
        assert_eq!(configuration.server_address(), DEFAULT_SERVER_ADDRESS);
        assert_eq!(configuration.server_port(), DEFAULT_SERVER_PORT);
        assert_eq!(configuration.server_context_path(), "");
        assert_eq!(configuration.auth_username(), DEFAULT_AUTH_USERNAME);
        assert_eq!(
            configuration.token_expire_seconds(),
            DEFAULT_TOKEN_EXPIRE_SECONDS
        );
    }
}
