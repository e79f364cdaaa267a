//! Configuration loading traits and types.
//!
//! All daqcore processes read their configuration from TOML files. This
//! module provides the loading trait plus the `[shared]` block every
//! application config embeds.
//!
//! # Usage
//!
//! ```rust,no_run
//! use daq_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct AppConfig {
//!     shared: SharedConfig,
//!     shm_dir: String,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = AppConfig::load(Path::new("daq.toml"))?;
//!     config.shared.validate()?;
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log verbosity level, with lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string accepted by `tracing_subscriber::EnvFilter`.
    pub const fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields shared across all daqcore processes.
///
/// Embed this in application-specific configuration structs under a
/// `[shared]` table.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "ro01-sender"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Process instance identifier, used in log output and segment names.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty or
    /// contains path separators (it is embedded in shm file names).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        if self.service_name.contains('/') {
            return Err(ConfigError::ValidationError(
                "service_name cannot contain '/'".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
/// - Semantic validation is the caller's responsibility (`validate()`)
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation: any serde-deserializable struct can be loaded.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        shared: SharedConfig,
        port: u16,
    }

    #[test]
    fn log_level_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn log_level_toml_roundtrip() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Wrapper {
            level: LogLevel,
        }

        for (level, text) in [
            (LogLevel::Trace, "trace"),
            (LogLevel::Debug, "debug"),
            (LogLevel::Info, "info"),
            (LogLevel::Warn, "warn"),
            (LogLevel::Error, "error"),
        ] {
            let wrapper = Wrapper { level };
            let toml_text = toml::to_string(&wrapper).unwrap();
            assert!(toml_text.contains(text));
            assert_eq!(toml::from_str::<Wrapper>(&toml_text).unwrap(), wrapper);
        }
    }

    #[test]
    fn load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "port = 9090\n[shared]\nlog_level = \"warn\"\nservice_name = \"ro01\""
        )
        .unwrap();

        let config = TestConfig::load(file.path()).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.shared.log_level, LogLevel::Warn);
        assert_eq!(config.shared.service_name, "ro01");
        assert!(config.shared.validate().is_ok());
    }

    #[test]
    fn load_missing_file() {
        let result = TestConfig::load(Path::new("/nonexistent/daq.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn validate_rejects_bad_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: String::new(),
        };
        assert!(config.validate().is_err());

        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: "a/b".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
