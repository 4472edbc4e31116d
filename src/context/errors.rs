//! # Context Errors

use thiserror::Error;

/// Result type for context operations
pub type ContextResult<T> = Result<T, ContextError>;

/// Ambient context storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The selected adapter cannot hold a value in the current execution
    #[error("Ambient storage misconfigured for the {adapter} adapter: {reason}")]
    StorageMisconfigured {
        adapter: &'static str,
        reason: String,
    },
}

impl ContextError {
    pub(crate) fn misconfigured(adapter: &'static str, reason: impl Into<String>) -> Self {
        ContextError::StorageMisconfigured {
            adapter,
            reason: reason.into(),
        }
    }
}
