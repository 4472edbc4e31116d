//! Schema file errors
//!
//! Error codes:
//! - AERO_SCHEMA_MALFORMED (FATAL): unreadable file or invalid JSON
//! - AERO_SCHEMA_INVALID (REJECT): well-formed file that declares an invalid model
//! - AERO_SCHEMA_IMMUTABLE (REJECT): model name already registered
//! - AERO_UNKNOWN_SCHEMA (REJECT): no model with that name

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, process continues
    Reject,
    /// Startup cannot continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    AeroSchemaMalformed,
    AeroSchemaInvalid,
    AeroSchemaImmutable,
    AeroUnknownSchema,
}

impl SchemaErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::AeroSchemaMalformed => "AERO_SCHEMA_MALFORMED",
            SchemaErrorCode::AeroSchemaInvalid => "AERO_SCHEMA_INVALID",
            SchemaErrorCode::AeroSchemaImmutable => "AERO_SCHEMA_IMMUTABLE",
            SchemaErrorCode::AeroUnknownSchema => "AERO_UNKNOWN_SCHEMA",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::AeroSchemaMalformed => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema loading error with context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Model name if known
    model: Option<String>,
    /// Source file if any
    path: Option<String>,
}

impl SchemaError {
    /// File could not be read or parsed
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            code: SchemaErrorCode::AeroSchemaMalformed,
            message: format!("Malformed schema file '{}': {}", path, reason.into()),
            model: None,
            path: Some(path),
        }
    }

    /// Model declaration rejected
    pub fn invalid(model: impl Into<String>, reason: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            code: SchemaErrorCode::AeroSchemaInvalid,
            message: format!("Schema for '{}' is invalid: {}", model, reason.into()),
            model: Some(model),
            path: None,
        }
    }

    pub fn immutable(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            code: SchemaErrorCode::AeroSchemaImmutable,
            message: format!("Schema '{}' is already registered", model),
            model: Some(model),
            path: None,
        }
    }

    pub fn unknown(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            code: SchemaErrorCode::AeroUnknownSchema,
            message: format!("Schema '{}' not found", model),
            model: Some(model),
            path: None,
        }
    }

    /// Attaches the file the error came from
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let (Some(path), SchemaErrorCode::AeroSchemaInvalid) = (&self.path, self.code) {
            write!(f, " (in {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::AeroSchemaMalformed.code(), "AERO_SCHEMA_MALFORMED");
        assert_eq!(SchemaErrorCode::AeroSchemaInvalid.code(), "AERO_SCHEMA_INVALID");
        assert_eq!(SchemaErrorCode::AeroSchemaImmutable.code(), "AERO_SCHEMA_IMMUTABLE");
        assert_eq!(SchemaErrorCode::AeroUnknownSchema.code(), "AERO_UNKNOWN_SCHEMA");
    }

    #[test]
    fn test_severity_levels() {
        assert!(SchemaError::malformed("a.json", "bad").is_fatal());
        assert!(!SchemaError::invalid("User", "bad").is_fatal());
    }

    #[test]
    fn test_display_names_file() {
        let err = SchemaError::invalid("User", "missing id").at("users.json");
        let display = err.to_string();
        assert!(display.starts_with("[REJECT] AERO_SCHEMA_INVALID"));
        assert!(display.contains("users.json"));
        assert_eq!(err.model(), Some("User"));
    }
}
