//! Ambient request context
//!
//! The "current actor" consulted by access rules and authorization
//! predicates without explicit threading. Two storage strategies:
//!
//! - `Global`: one shared slot, for hosts without overlapping flows
//! - `Scoped`: task-local storage, required when concurrent flows share
//!   the process
//!
//! A model instance may carry its own context, which takes precedence over
//! the ambient one.

mod adapter;
mod errors;
mod global;
mod scoped;

pub use adapter::ContextAdapter;
pub use errors::{ContextError, ContextResult};
pub use global::GlobalAdapter;
pub use scoped::ScopedAdapter;

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::observability::{log_event_with_fields, Event};

/// The acting party of the current flow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Actor identifier (None if anonymous)
    pub actor: Option<String>,

    /// Roles granted to the actor
    #[serde(default)]
    pub roles: Vec<String>,

    /// Whether the actor is a trusted service
    #[serde(default)]
    pub is_service_role: bool,

    /// Free-form claims
    #[serde(default)]
    pub claims: HashMap<String, Value>,
}

impl Context {
    /// Create context for anonymous access
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Create context for an identified actor
    pub fn actor(id: impl Into<String>) -> Self {
        Self {
            actor: Some(id.into()),
            ..Self::default()
        }
    }

    /// Create context for a trusted service
    pub fn service_role() -> Self {
        Self {
            is_service_role: true,
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: Value) -> Self {
        self.claims.insert(key.into(), value);
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.actor.is_none() && !self.is_service_role
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Process-wide storage strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    #[default]
    Global,
    Scoped,
}

impl ContextMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextMode::Global => "global",
            ContextMode::Scoped => "scoped",
        }
    }
}

static MODE: AtomicU8 = AtomicU8::new(0);

/// Selects the process-wide adapter
pub fn configure(mode: ContextMode) {
    let raw = match mode {
        ContextMode::Global => 0,
        ContextMode::Scoped => 1,
    };
    MODE.store(raw, Ordering::SeqCst);
    log_event_with_fields(Event::ContextConfigured, &[("mode", mode.as_str())]);
}

/// Returns the selected adapter mode
pub fn mode() -> ContextMode {
    match MODE.load(Ordering::SeqCst) {
        1 => ContextMode::Scoped,
        _ => ContextMode::Global,
    }
}

/// Returns the ambient context, if any
pub fn current() -> Option<Context> {
    match mode() {
        ContextMode::Global => GlobalAdapter.get(),
        ContextMode::Scoped => ScopedAdapter.get(),
    }
}

/// Replaces the ambient context
pub fn set(ctx: Context) -> ContextResult<()> {
    match mode() {
        ContextMode::Global => GlobalAdapter.set(ctx),
        ContextMode::Scoped => ScopedAdapter.set(ctx),
    }
}

/// Clears the ambient context
pub fn reset() {
    match mode() {
        ContextMode::Global => GlobalAdapter.reset(),
        ContextMode::Scoped => ScopedAdapter.reset(),
    }
}

/// Runs `f` with `ctx` as the ambient context
pub fn run<T>(ctx: Context, f: impl FnOnce() -> T) -> T {
    match mode() {
        ContextMode::Global => GlobalAdapter.run(ctx, f),
        ContextMode::Scoped => ScopedAdapter.run(ctx, f),
    }
}

/// Runs an async task with `ctx` bound.
///
/// Requires the scoped adapter: a global slot cannot follow a task across
/// suspension points.
pub async fn scope<F: Future>(ctx: Context, future: F) -> ContextResult<F::Output> {
    match mode() {
        ContextMode::Scoped => Ok(ScopedAdapter.scope(ctx, future).await),
        ContextMode::Global => Err(ContextError::misconfigured(
            "global",
            "async scopes require the scoped adapter",
        )),
    }
}
