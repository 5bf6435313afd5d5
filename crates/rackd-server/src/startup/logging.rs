//! Logging initialisation
//!
//! Console logging by default; when a log directory is configured, events
//! are additionally written to a daily-rotated `rackd.log` in that
//! directory. `RUST_LOG` overrides the configured level.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging settings extracted from the configuration
#[derive(Clone, Debug, Default)]
pub struct LoggingConfig {
    pub directory: Option<String>,
    pub level: String,
}

/// Initialise the tracing subscriber. The returned guard must be held for
/// the lifetime of the process so buffered file output is flushed.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "rackd.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer())
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer())
                .init();

            None
        }
    }
}
