//! aeromodel - A strict, schema-driven domain model runtime
//!
//! Models are declared once as schemas of typed fields. Instances are
//! created through `make` (new entities: defaults, generators, computed
//! values) or `from` (existing entities, hydrated as-is). Every field
//! access is gated by readability, writability, nullability and
//! validators; every write is recorded in a change log.

pub mod association;
pub mod auth;
pub mod cli;
pub mod config;
pub mod context;
pub mod field;
pub mod messages;
pub mod model;
pub mod observability;
pub mod schema;

pub use context::{Context, ContextMode};
pub use field::{BoundField, Field};
pub use model::{Change, ErrorCode, ErrorList, Initializer, Model, ModelError, ModelResult};
pub use schema::{ModelSchema, SchemaBuilder, SchemaLoader};
