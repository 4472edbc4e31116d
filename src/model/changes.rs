//! Change history
//!
//! Every committed mutation appends one entry. Unsetting a field removes
//! its entries instead of recording a negation.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::field::values_equal;

/// One committed mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub field: String,
    /// Value before the mutation; None if the field was uninitialized
    pub previous: Option<Value>,
    pub current: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

/// Append-only, field-erasable mutation log
#[derive(Debug, Clone, Default)]
pub(crate) struct ChangeLog {
    entries: Vec<Change>,
}

impl ChangeLog {
    pub(crate) fn record(&mut self, field: &str, previous: Option<Value>, current: Option<Value>) {
        self.entries.push(Change {
            field: field.to_string(),
            previous,
            current,
            timestamp: Utc::now(),
        });
    }

    /// Removes every entry of `field`
    pub(crate) fn erase(&mut self, field: &str) {
        self.entries.retain(|change| change.field != field);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Full log, newest first
    pub(crate) fn newest_first(&self) -> Vec<Change> {
        self.entries.iter().rev().cloned().collect()
    }

    /// Most recent entry per field, minus fields that are back at their
    /// baseline value
    pub(crate) fn net_changes(&self, baseline: &HashMap<String, Value>) -> BTreeMap<String, Change> {
        let mut seen = HashSet::new();
        let mut changes = BTreeMap::new();

        for change in self.entries.iter().rev() {
            if !seen.insert(change.field.as_str()) {
                continue;
            }
            let unchanged = match (change.current.as_ref(), baseline.get(&change.field)) {
                (Some(current), Some(initial)) => values_equal(current, initial),
                (None, None) => true,
                _ => false,
            };
            if !unchanged {
                changes.insert(change.field.clone(), change.clone());
            }
        }
        changes
    }
}
