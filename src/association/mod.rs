//! # Association Registry
//!
//! Process-wide table of cross-model key relationships. An association
//! says: the value at `target_path` on the embedded related value must equal
//! the value at `source_path` on the owning model.
//!
//! Related records are never fetched; only the embedded value is checked.
//!
//! ## Invariants
//! - Append-only: `associations()` returns every registered entry
//! - Re-registering `"{source_model}.{field_name}"` replaces its validator
//! - A missing path segment resolves to absent; both sides absent is a
//!   match, absent on one side only is a mismatch

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::values_equal;
use crate::model::Model;
use crate::observability::{log_event_with_fields, Event};

/// Consistency check: (owning model, embedded related value) -> matches
pub type AssociationValidator = Arc<dyn Fn(&Model, &Value) -> bool + Send + Sync>;

/// One declared cross-model key relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub source_model: String,
    /// Dot path on the owning model
    pub source_path: String,
    pub field_name: String,
    pub target_model: String,
    /// Dot path on the embedded related value
    pub target_path: String,
}

impl Association {
    /// Registry key
    pub fn key(&self) -> String {
        format!("{}.{}", self.source_model, self.field_name)
    }

    fn compile(&self) -> AssociationValidator {
        let source_path = self.source_path.clone();
        let target_path = self.target_path.clone();
        Arc::new(move |model: &Model, candidate: &Value| {
            match (
                resolve_model_path(model, &source_path),
                resolve_path(candidate, &target_path),
            ) {
                (None, None) => true,
                (Some(source), Some(target)) => values_equal(source, target),
                _ => false,
            }
        })
    }
}

/// Entries plus compiled validators
#[derive(Default)]
pub struct AssociationRegistry {
    entries: Vec<Association>,
    validators: HashMap<String, AssociationValidator>,
}

impl AssociationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, association: Association) {
        let validator = association.compile();
        self.validators.insert(association.key(), validator);
        self.entries.push(association);
    }

    pub fn validator(&self, source_model: &str, field_name: &str) -> Option<AssociationValidator> {
        self.validators
            .get(&format!("{}.{}", source_model, field_name))
            .cloned()
    }

    pub fn associations(&self) -> &[Association] {
        &self.entries
    }
}

impl fmt::Debug for AssociationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociationRegistry")
            .field("entries", &self.entries)
            .finish()
    }
}

static REGISTRY: LazyLock<RwLock<AssociationRegistry>> =
    LazyLock::new(|| RwLock::new(AssociationRegistry::new()));

/// Registers an association process-wide
pub fn register(association: Association) {
    let key = association.key();
    let target = association.target_model.clone();
    REGISTRY
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .register(association);
    log_event_with_fields(
        Event::AssociationRegistered,
        &[("key", &key), ("target", &target)],
    );
}

/// Validator for `source_model.field_name`, if registered
pub fn validator(source_model: &str, field_name: &str) -> Option<AssociationValidator> {
    REGISTRY
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .validator(source_model, field_name)
}

/// Every registered entry, in registration order
pub fn associations() -> Vec<Association> {
    REGISTRY
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .associations()
        .to_vec()
}

/// Clears the registry
pub fn reset() {
    *REGISTRY.write().unwrap_or_else(|e| e.into_inner()) = AssociationRegistry::new();
}

/// Resolves a dot path. Numeric segments index arrays; any missing
/// segment yields None.
pub fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Resolves a dot path whose first segment names a field of `model`
fn resolve_model_path<'m>(model: &'m Model, path: &str) -> Option<&'m Value> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let value = model.state_value(head)?;
    match rest {
        Some(rest) => resolve_path(value, rest),
        None => Some(value),
    }
}
