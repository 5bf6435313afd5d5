//! Server startup: HTTP binding, logging, shutdown

pub mod http;
pub mod logging;
pub mod shutdown;

pub use http::api_server;
pub use logging::{LoggingConfig, init_logging};
pub use shutdown::shutdown_signal;
