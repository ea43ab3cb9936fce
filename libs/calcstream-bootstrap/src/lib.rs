//! Process bootstrap shared by the calculator binaries: layered configuration,
//! logging initialization and shutdown signals.

pub mod config;
pub mod logging;
pub mod signals;

pub use config::{ConfigError, LogFormat, LoggingConfig, load_layered};
pub use logging::init_logging;
pub use signals::{shutdown_token, wait_for_shutdown};
