//! Layered configuration loading.
//!
//! Layers, later wins:
//! 1) `T::default()`
//! 2) YAML file, if a path is given (a missing file is an error)
//! 3) environment variables `<PREFIX>__*`, with `__` separating nested keys
//!
//! CLI overrides are applied by each binary on the extracted value.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Configuration error for layered loading
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {path}")]
    MissingFile { path: String },
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Output format of the log subscriber.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Logging section shared by all binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `calculator=debug,tonic=warn`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Apply `-v` counting from the command line (-v info, -vv debug, -vvv trace).
    #[must_use]
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        let level = match verbose {
            0 => return self,
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        self.level = level.to_owned();
        self
    }
}

/// Load `T` from defaults, an optional YAML file and `<env_prefix>__*` variables.
///
/// # Errors
/// Returns [`ConfigError::MissingFile`] if `path` is given but is not a file, and
/// [`ConfigError::Invalid`] if any layer fails to parse or extract.
pub fn load_layered<T>(path: Option<&Path>, env_prefix: &str) -> Result<T, ConfigError>
where
    T: Serialize + DeserializeOwned + Default,
{
    let mut figment = Figment::new().merge(Serialized::defaults(T::default()));

    if let Some(path) = path {
        if !path.is_file() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }
        figment = figment.merge(Yaml::file(path));
    }

    figment
        .merge(Env::prefixed(&format!("{env_prefix}__")).split("__"))
        .extract()
        .map_err(|e| ConfigError::Invalid(Box::new(e)))
}
