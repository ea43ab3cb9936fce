//! Server configuration.

use std::path::Path;

use calcstream_bootstrap::{ConfigError, LoggingConfig, load_layered};
use calcstream_transport_grpc::ListenConfig;
use calcstream_transport_grpc::server::DEFAULT_LISTEN_ADDR;
use serde::{Deserialize, Serialize};

/// Environment variables `CALCULATOR__*` override file values.
pub const ENV_PREFIX: &str = "CALCULATOR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorServerConfig {
    /// `host:port` to bind; port 0 picks an ephemeral port.
    pub listen_addr: String,
    pub logging: LoggingConfig,
}

impl Default for CalculatorServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl CalculatorServerConfig {
    /// Load defaults, then `path` if given, then `CALCULATOR__*` variables.
    ///
    /// # Errors
    /// See [`load_layered`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_layered(path, ENV_PREFIX)
    }

    /// Parsed listen address.
    ///
    /// # Errors
    /// Returns an error if `listen_addr` is not a TCP `host:port`.
    pub fn listen(&self) -> anyhow::Result<ListenConfig> {
        ListenConfig::parse(&self.listen_addr)
    }
}
