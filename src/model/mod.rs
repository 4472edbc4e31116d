//! Model runtime
//!
//! - `Model`: live instance with state, change log and accessors
//! - instantiation protocol (`Model::make`, `Model::from`)
//! - tracked array/object views
//! - error taxonomy

mod changes;
mod errors;
mod initializer;
#[allow(clippy::module_inception)]
mod model;
mod tracked;

pub use changes::Change;
pub use errors::{ErrorCategory, ErrorCode, ErrorList, ModelError, ModelResult};
pub use initializer::Initializer;
pub use model::Model;
pub use tracked::{TrackedList, TrackedMap};
