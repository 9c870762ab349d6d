//! Application configuration management.
//!
//! Configuration is layered with the `config` crate:
//! - built-in defaults
//! - an optional TOML file
//! - environment variables prefixed with `RAILBOARD_`, using `__` between
//!   nesting levels (e.g. `RAILBOARD_API__ADDRESS=0.0.0.0:8080`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RailboardError, Result};

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "RAILBOARD";

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "RAILBOARD_CONFIG";

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// REST API listener.
    pub api: ApiConfig,

    /// Prometheus exposition listener.
    pub metrics: MetricsConfig,

    /// Store snapshot location.
    pub storage: StorageConfig,

    /// Log output.
    pub logging: LoggingConfig,
}

/// REST API listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Listen address in `host:port` form.
    pub address: String,

    /// How long in-flight requests may keep the server alive after a stop request.
    pub shutdown_grace_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8080".to_string(),
            shutdown_grace_secs: 5,
        }
    }
}

impl ApiConfig {
    /// Grace period as a [`Duration`].
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Prometheus exposition settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Listen address; no exposition listener is started when unset.
    pub address: Option<String>,
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot directory; the platform default is used when unset.
    pub data_dir: Option<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// JSON file logs plus compact stdout instead of pretty stdout.
    pub production: bool,

    /// Directory for production log files; the platform default is used when unset.
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the file named by `RAILBOARD_CONFIG`, or the
    /// default location, overlaid with environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the result is invalid.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => PathBuf::from(path),
            None => default_config_path()?,
        };
        Self::load_from(&path)
    }

    /// Load configuration from `path` (which may be missing), overlaid with
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the result is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: &Path, prefix: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Check listener addresses.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an address is not in `host:port` form or the
    /// API and metrics listeners share an address.
    pub fn validate(&self) -> Result<()> {
        validate_address("api.address", &self.api.address)?;

        if let Some(metrics) = &self.metrics.address {
            validate_address("metrics.address", metrics)?;
            if *metrics == self.api.address {
                return Err(RailboardError::ConfigError(
                    "metrics.address must differ from api.address".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn validate_address(field: &str, address: &str) -> Result<()> {
    let valid = address
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());

    if valid {
        Ok(())
    } else {
        Err(RailboardError::ConfigError(format!(
            "{field}: '{address}' is not a host:port address"
        )))
    }
}

/// Default configuration file location.
///
/// On Linux: `/etc/railboard/config.toml`
/// Elsewhere: the platform config directory.
///
/// # Errors
///
/// Returns an error if the platform config directory cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        Ok(PathBuf::from("/etc/railboard/config.toml"))
    }
    #[cfg(not(target_os = "linux"))]
    {
        directories::ProjectDirs::from("", "", "railboard")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| RailboardError::ConfigError("Cannot determine config directory".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_with_prefix(&dir.path().join("absent.toml"), "RAILBOARD_TEST_NONE")
            .unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api.shutdown_grace(), Duration::from_secs(5));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\naddress = \"0.0.0.0:9000\"\n\n[metrics]\naddress = \"0.0.0.0:9100\"\n",
        )
        .unwrap();

        let config = Config::load_with_prefix(&path, "RAILBOARD_TEST_FILE").unwrap();
        assert_eq!(config.api.address, "0.0.0.0:9000");
        assert_eq!(config.api.shutdown_grace_secs, 5);
        assert_eq!(config.metrics.address.as_deref(), Some("0.0.0.0:9100"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\naddress = \"0.0.0.0:9000\"\n").unwrap();

        std::env::set_var("RAILBOARD_TEST_ENV_API__ADDRESS", "127.0.0.1:9001");
        let config = Config::load_with_prefix(&path, "RAILBOARD_TEST_ENV").unwrap();
        std::env::remove_var("RAILBOARD_TEST_ENV_API__ADDRESS");

        assert_eq!(config.api.address, "127.0.0.1:9001");
    }

    #[test]
    fn test_validate_rejects_bad_addresses() {
        let mut config = Config::default();
        config.api.address = "localhost".to_string();
        assert!(config.validate().is_err());

        config.api.address = "localhost:8080".to_string();
        assert!(config.validate().is_ok());

        config.metrics.address = Some("localhost:8080".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_address_shape_rules() {
        for valid in ["localhost:8080", "0.0.0.0:0", "[::1]:9100", "rail.example:65535"] {
            assert!(validate_address("api.address", valid).is_ok(), "{valid}");
        }
        for invalid in [":8080", "localhost:", "localhost:65536", "localhost:http"] {
            assert!(validate_address("api.address", invalid).is_err(), "{invalid}");
        }
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\naddress = \"nowhere\"\n").unwrap();

        let err = Config::load_with_prefix(&path, "RAILBOARD_TEST_BAD").unwrap_err();
        assert!(matches!(err, RailboardError::ConfigError(_)));
    }
}
