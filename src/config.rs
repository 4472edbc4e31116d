//! Runtime configuration
//!
//! ```json
//! {
//!   "log_level": "INFO",
//!   "hide_error_codes": false,
//!   "context_mode": "scoped",
//!   "schema_dir": "./schemas"
//! }
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{self, ContextMode};
use crate::messages;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid log_level '{0}'")]
    InvalidLogLevel(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Process-wide runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Minimum log severity (default "WARN")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Drop `[CODE]` prefixes from rendered error messages
    #[serde(default)]
    pub hide_error_codes: bool,

    #[serde(default)]
    pub context_mode: ContextMode,

    /// Directory of `*.json` model declarations
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,
}

fn default_log_level() -> String {
    "WARN".to_string()
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("./schemas")
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            hide_error_codes: false,
            context_mode: ContextMode::default(),
            schema_dir: default_schema_dir(),
        }
    }
}

impl RuntimeConfig {
    /// Loads and validates a config file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        let config: RuntimeConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: display,
                source,
            })?;

        config.severity()?;
        Ok(config)
    }

    pub fn severity(&self) -> ConfigResult<Severity> {
        Severity::parse(&self.log_level)
            .ok_or_else(|| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// Installs the logger level, message code hiding and context mode
    pub fn apply(&self) -> ConfigResult<()> {
        Logger::set_min_severity(self.severity()?);
        messages::hide_codes(self.hide_error_codes);
        context::configure(self.context_mode);

        let schema_dir = self.schema_dir.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("context_mode", self.context_mode.as_str()),
                ("log_level", &self.log_level),
                ("schema_dir", &schema_dir),
            ],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("aeromodel.json");
        fs::write(&path, "{}").unwrap();

        let config = RuntimeConfig::load(&path).unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.severity().unwrap(), Severity::Warn);
    }

    #[test]
    fn test_config_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("aeromodel.json");
        fs::write(
            &path,
            r#"{"log_level": "info", "hide_error_codes": true, "context_mode": "scoped", "schema_dir": "/etc/models"}"#,
        )
        .unwrap();

        let config = RuntimeConfig::load(&path).unwrap();
        assert!(config.hide_error_codes);
        assert_eq!(config.context_mode, ContextMode::Scoped);
        assert_eq!(config.schema_dir, PathBuf::from("/etc/models"));
        assert_eq!(config.severity().unwrap(), Severity::Info);
    }

    #[test]
    fn test_config_rejects_bad_level() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("aeromodel.json");
        fs::write(&path, r#"{"log_level": "LOUD"}"#).unwrap();

        let err = RuntimeConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("aeromodel.json");
        fs::write(&path, r#"{"data_dir": "/tmp"}"#).unwrap();

        assert!(matches!(
            RuntimeConfig::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = RuntimeConfig::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
