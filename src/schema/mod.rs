//! Schema declaration subsystem
//!
//! A model type is declared once, either in code through `ModelSchema::builder`
//! and the field factories, or as a JSON file read by `SchemaLoader`.
//!
//! # Design Principles
//!
//! - Declarations are immutable once built
//! - One builder type for every field kind
//! - Associations become process-wide only when a schema is registered

mod builder;
pub mod catalog;
mod document;
mod errors;
mod loader;
mod model_schema;
mod types;

pub use builder::{
    any, array, boolean, custom, date, id, integer, number, object, related, string, FieldBuilder,
};
pub use document::{AssociateDocument, FieldDocument, RuleDocument, SchemaDocument};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use loader::SchemaLoader;
pub use model_schema::{ModelSchema, SchemaBuilder};
pub use types::{
    Access, AccessRule, Associate, Compute, DefaultValue, FieldKind, FieldMeta, FieldOptions,
    Generator, IntoRuleResult, Mode, RuleError, RuleResult, Validator, Verdict,
};
