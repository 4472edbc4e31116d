//! Observable events for aeromodel
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in the model runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Runtime configuration loaded
    ConfigLoaded,
    /// Ambient context adapter selected
    ContextConfigured,

    // Schema declaration
    /// Model schema registered
    SchemaRegistered,
    /// Schema files loaded from disk
    SchemasLoaded,
    /// Association validator compiled
    AssociationRegistered,
    /// Global generator installed for a field kind
    GlobalGeneratorSet,
    /// Global validator installed for a field kind
    GlobalValidatorSet,

    // Instantiation
    /// New entity constructed
    ModelMade,
    /// Existing entity hydrated
    ModelHydrated,
    /// Construction aborted by validation
    ModelRejected,
    /// Input key not declared in the schema
    UnknownInputKey,

    // Authorization
    /// Guarded method call denied
    AuthorizationDenied,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ContextConfigured => "CONTEXT_CONFIGURED",
            Event::SchemaRegistered => "SCHEMA_REGISTERED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::AssociationRegistered => "ASSOCIATION_REGISTERED",
            Event::GlobalGeneratorSet => "GLOBAL_GENERATOR_SET",
            Event::GlobalValidatorSet => "GLOBAL_VALIDATOR_SET",
            Event::ModelMade => "MODEL_MADE",
            Event::ModelHydrated => "MODEL_HYDRATED",
            Event::ModelRejected => "MODEL_REJECTED",
            Event::UnknownInputKey => "UNKNOWN_INPUT_KEY",
            Event::AuthorizationDenied => "AUTHORIZATION_DENIED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::AuthorizationDenied => Severity::Warn,
            // The caller already receives the rejection as an error
            Event::ModelRejected
            | Event::ConfigLoaded
            | Event::SchemasLoaded
            | Event::ContextConfigured => Severity::Info,
            _ => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
