//! Harness configuration
//!
//! A single YAML document with three optional sections:
//!
//! ```yaml
//! driver:
//!   headless: true
//!   element_timeout_ms: 10000
//! wait:
//!   max_attempts: 10
//!   poll_interval_ms: 500
//! logging:
//!   filter: "pagestep=debug"
//!   format: json
//! ```
//!
//! Every field has a default, so an empty document is a valid configuration.

use crate::driver::DriverConfig;
use crate::logging::LoggingConfig;
use crate::result::{DispatchError, DispatchResult};
use crate::wait::PollOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "PAGESTEP_CONFIG";

/// File looked up in the working directory when nothing else is given
pub const DEFAULT_CONFIG_FILE: &str = "pagestep.yaml";

/// Top-level harness configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Browser driver settings
    pub driver: DriverConfig,
    /// Defaults for the polling wait verb
    pub wait: PollOptions,
    /// Log output settings
    pub logging: LoggingConfig,
}

impl HarnessConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> DispatchResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| DispatchError::Config {
            message: e.to_string(),
        })
    }

    /// Read and parse a YAML file
    pub fn from_file(path: &Path) -> DispatchResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml).map_err(|err| match err {
            DispatchError::Config { message } => DispatchError::Config {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `PAGESTEP_CONFIG` is consulted,
    /// then `pagestep.yaml`; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> DispatchResult<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(&PathBuf::from(path));
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.exists() {
            Self::from_file(default)
        } else {
            tracing::debug!(file = DEFAULT_CONFIG_FILE, "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> DispatchResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| DispatchError::Config {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_document_is_default() {
        let config = HarnessConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.wait.max_attempts, 10);
        assert_eq!(config.driver.element_timeout_ms, 10_000);
    }

    #[test]
    fn test_partial_sections() {
        let yaml = "driver:\n  headless: false\n  sandbox: false\nwait:\n  poll_interval_ms: 100\nlogging:\n  format: json\n";
        let config = HarnessConfig::from_yaml_str(yaml).unwrap();
        assert!(!config.driver.headless);
        assert!(!config.driver.sandbox);
        assert_eq!(config.driver.viewport_width, 1920);
        assert_eq!(config.wait.poll_interval_ms, 100);
        assert_eq!(config.wait.max_attempts, 10);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_malformed_document() {
        let err = HarnessConfig::from_yaml_str("wait: [1, 2").unwrap_err();
        assert!(matches!(err, DispatchError::Config { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "wait:\n  max_attempts: 3").unwrap();
        let config = HarnessConfig::from_file(file.path()).unwrap();
        assert_eq!(config.wait.max_attempts, 3);
    }

    #[test]
    fn test_malformed_file_names_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "driver: [").unwrap();
        let err = HarnessConfig::load(Some(file.path())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_explicit_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HarnessConfig::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, DispatchError::Io(_)));
    }

    #[test]
    fn test_yaml_round_trip_keeps_values() {
        let mut config = HarnessConfig::default();
        config.driver = config.driver.no_sandbox().element_timeout(2500);
        let yaml = config.to_yaml().unwrap();
        assert_eq!(HarnessConfig::from_yaml_str(&yaml).unwrap(), config);
    }
}
