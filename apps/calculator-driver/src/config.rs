//! Driver configuration.

use std::path::Path;
use std::time::Duration;

use calcstream_bootstrap::{ConfigError, LoggingConfig, load_layered};
use calcstream_transport_grpc::client::GrpcClientConfig;
use serde::{Deserialize, Serialize};

/// Environment variables `CALCULATOR_DRIVER__*` override file values.
pub const ENV_PREFIX: &str = "CALCULATOR_DRIVER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Calculator service URI.
    pub endpoint: String,
    /// Deadline of each call, covering whole streams.
    pub call_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// Connection attempts after the first one. Calls are never retried.
    pub connect_retries: u32,
    pub logging: LoggingConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:50051".to_owned(),
            call_timeout_ms: 1000,
            connect_timeout_ms: 5000,
            connect_retries: 3,
            logging: LoggingConfig::default(),
        }
    }
}

impl DriverConfig {
    /// Load defaults, then `path` if given, then `CALCULATOR_DRIVER__*` variables.
    ///
    /// # Errors
    /// See [`load_layered`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_layered(path, ENV_PREFIX)
    }

    /// Transport settings for connecting to the calculator.
    #[must_use]
    pub fn grpc_client_config(&self) -> GrpcClientConfig {
        GrpcClientConfig::new("calculator")
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_rpc_timeout(Duration::from_millis(self.call_timeout_ms))
            .with_max_retries(self.connect_retries)
    }
}
