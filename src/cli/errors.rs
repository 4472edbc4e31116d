//! CLI-specific error types

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::model::ModelError;
use crate::schema::SchemaError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (input file, stdin, stdout)
    IoError,
    /// Schema directory could not be loaded
    SchemaError,
    /// Model name not declared
    UnknownModel,
    /// Model construction or validation failed
    ModelRejected,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "AERO_CLI_CONFIG_ERROR",
            Self::IoError => "AERO_CLI_IO_ERROR",
            Self::SchemaError => "AERO_CLI_SCHEMA_ERROR",
            Self::UnknownModel => "AERO_CLI_UNKNOWN_MODEL",
            Self::ModelRejected => "AERO_CLI_MODEL_REJECTED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn unknown_model(model: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownModel,
            format!("Model '{}' is not declared. Run 'aeromodel schemas' to list models.", model),
        )
    }

    pub fn model_rejected(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ModelRejected, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaError, e.to_string())
    }
}

impl From<ModelError> for CliError {
    fn from(e: ModelError) -> Self {
        let mut message = e.message();
        if let Some(errors) = e.errors() {
            for nested in errors {
                message.push_str("\n  - ");
                message.push_str(&nested.message());
            }
        }
        Self::model_rejected(message)
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
