//! # Method Authorization
//!
//! Per-model-type table mapping method names to permission predicates
//! `(context, model) -> bool`, built at schema declaration time and
//! consulted before guarded calls.
//!
//! ## Invariants
//! - Only a predicate returning `Ok(true)` allows the call
//! - `Ok(false)` and predicate errors both deny (fail closed)
//! - Methods without a registered predicate are not guarded

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::model::{Model, ModelError, ModelResult};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{IntoRuleResult, RuleResult};

/// Permission predicate for one method
pub type Permission = Arc<dyn Fn(&Context, &Model) -> RuleResult + Send + Sync>;

/// Method name -> permission predicate
#[derive(Clone, Default)]
pub struct PermissionTable {
    rules: HashMap<String, Permission>,
}

impl PermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F, R>(&mut self, method: impl Into<String>, rule: F)
    where
        F: Fn(&Context, &Model) -> R + Send + Sync + 'static,
        R: IntoRuleResult,
    {
        self.rules.insert(
            method.into(),
            Arc::new(move |ctx, model| rule(ctx, model).into_rule_result()),
        );
    }

    pub fn get(&self, method: &str) -> Option<&Permission> {
        self.rules.get(method)
    }

    /// Names of every guarded method, sorted
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    pub fn is_guarded(&self, method: &str) -> bool {
        self.rules.contains_key(method)
    }
}

impl fmt::Debug for PermissionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionTable")
            .field("methods", &self.methods())
            .finish()
    }
}

/// Checks `method` on `model` against its permission table
pub fn check(model: &Model, method: &str) -> ModelResult<()> {
    let Some(rule) = model.schema().permissions().get(method) else {
        return Ok(());
    };

    let ctx = model.context();
    match rule(&ctx, model) {
        Ok(true) => Ok(()),
        outcome => {
            let reason = match outcome {
                Err(err) => err.to_string(),
                _ => "predicate returned false".to_string(),
            };
            let actor = ctx.actor.as_deref().unwrap_or("anonymous");
            log_event_with_fields(
                Event::AuthorizationDenied,
                &[
                    ("actor", actor),
                    ("method", method),
                    ("model", model.name()),
                    ("reason", &reason),
                ],
            );
            Err(ModelError::UnauthorizedMethodCall {
                model: model.name().to_string(),
                method: method.to_string(),
            })
        }
    }
}
