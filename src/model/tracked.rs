//! Tracked containers
//!
//! Array and object fields are mutated in place through these wrappers.
//! Each mutation reads the current value through the field's `get`, applies
//! the operation, then commits the whole container back through `set`, so
//! the change log records the final container state.

use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::field::{compare_values, json_type_name, Field};

use super::errors::{ModelError, ModelResult};
use super::model::Model;

fn shape_error(field: &Field, expected: &str, found: &Value) -> ModelError {
    ModelError::SetError {
        model: field.meta().model.clone(),
        field: field.name().to_string(),
        reason: format!("expected {}, got {}", expected, json_type_name(found)),
    }
}

fn clamp(range: Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    range.start.min(end)..end
}

/// Mutable view over an array field
pub struct TrackedList<'m> {
    model: &'m mut Model,
    field: Arc<Field>,
}

impl<'m> TrackedList<'m> {
    pub(crate) fn new(model: &'m mut Model, field: Arc<Field>) -> Self {
        Self { model, field }
    }

    /// Current elements
    pub fn items(&self) -> ModelResult<Vec<Value>> {
        match self.field.get(self.model)? {
            Value::Array(items) => Ok(items),
            other => Err(shape_error(&self.field, "array", &other)),
        }
    }

    pub fn len(&self) -> ModelResult<usize> {
        Ok(self.items()?.len())
    }

    pub fn is_empty(&self) -> ModelResult<bool> {
        Ok(self.items()?.is_empty())
    }

    fn mutate<T>(&mut self, op: impl FnOnce(&mut Vec<Value>) -> T) -> ModelResult<T> {
        let mut items = self.items()?;
        let out = op(&mut items);
        self.field.set(self.model, Value::Array(items))?;
        Ok(out)
    }

    /// Appends a value, returning the new length
    pub fn push(&mut self, value: impl Into<Value>) -> ModelResult<usize> {
        let value = value.into();
        self.mutate(|items| {
            items.push(value);
            items.len()
        })
    }

    pub fn pop(&mut self) -> ModelResult<Option<Value>> {
        self.mutate(|items| items.pop())
    }

    /// Removes the first element
    pub fn shift(&mut self) -> ModelResult<Option<Value>> {
        self.mutate(|items| (!items.is_empty()).then(|| items.remove(0)))
    }

    /// Prepends a value, returning the new length
    pub fn unshift(&mut self, value: impl Into<Value>) -> ModelResult<usize> {
        let value = value.into();
        self.mutate(|items| {
            items.insert(0, value);
            items.len()
        })
    }

    /// Removes `delete_count` elements at `start` and inserts `insert` in
    /// their place, returning the removed elements. Out-of-range bounds
    /// are clamped.
    pub fn splice(
        &mut self,
        start: usize,
        delete_count: usize,
        insert: Vec<Value>,
    ) -> ModelResult<Vec<Value>> {
        self.mutate(|items| {
            let range = clamp(start..start.saturating_add(delete_count), items.len());
            items.splice(range, insert).collect()
        })
    }

    /// Sorts with the natural JSON value order
    pub fn sort(&mut self) -> ModelResult<()> {
        self.mutate(|items| items.sort_by(compare_values))
    }

    pub fn sort_by<F>(&mut self, compare: F) -> ModelResult<()>
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        self.mutate(|items| items.sort_by(compare))
    }

    pub fn reverse(&mut self) -> ModelResult<()> {
        self.mutate(|items| items.reverse())
    }

    /// Overwrites `range` with copies of `value`
    pub fn fill(&mut self, value: impl Into<Value>, range: Range<usize>) -> ModelResult<()> {
        let value = value.into();
        self.mutate(|items| {
            let range = clamp(range, items.len());
            for item in &mut items[range] {
                *item = value.clone();
            }
        })
    }

    /// Copies `src` to the position `dest` within the array, without
    /// changing its length
    pub fn copy_within(&mut self, src: Range<usize>, dest: usize) -> ModelResult<()> {
        self.mutate(|items| {
            let len = items.len();
            if dest >= len {
                return;
            }
            let src = clamp(src, len);
            let count = src.len().min(len - dest);
            let chunk = items[src.start..src.start + count].to_vec();
            items[dest..dest + count].clone_from_slice(&chunk);
        })
    }
}

/// Mutable view over an object field
pub struct TrackedMap<'m> {
    model: &'m mut Model,
    field: Arc<Field>,
}

impl<'m> TrackedMap<'m> {
    pub(crate) fn new(model: &'m mut Model, field: Arc<Field>) -> Self {
        Self { model, field }
    }

    /// Current entries
    pub fn entries(&self) -> ModelResult<Map<String, Value>> {
        match self.field.get(self.model)? {
            Value::Object(entries) => Ok(entries),
            other => Err(shape_error(&self.field, "object", &other)),
        }
    }

    pub fn get(&self, key: &str) -> ModelResult<Option<Value>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn mutate<T>(&mut self, op: impl FnOnce(&mut Map<String, Value>) -> T) -> ModelResult<T> {
        let mut entries = self.entries()?;
        let out = op(&mut entries);
        self.field.set(self.model, Value::Object(entries))?;
        Ok(out)
    }

    /// Sets one property, returning the value it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> ModelResult<Option<Value>> {
        let (key, value) = (key.into(), value.into());
        self.mutate(|entries| entries.insert(key, value))
    }

    pub fn remove(&mut self, key: &str) -> ModelResult<Option<Value>> {
        self.mutate(|entries| entries.remove(key))
    }

    /// Merges every entry of `source`, committing once
    pub fn assign(&mut self, source: Map<String, Value>) -> ModelResult<()> {
        self.mutate(|entries| entries.extend(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorCode;
    use crate::schema::{array, id, object, ModelSchema};
    use serde_json::json;

    fn schema() -> Arc<ModelSchema> {
        ModelSchema::builder("TrackedUser")
            .field("id", id())
            .field("groups", array())
            .field("prefs", object())
            .field("frozen", array().writable(false))
            .build()
            .unwrap()
    }

    fn hydrated() -> Model {
        schema()
            .from(json!({
                "id": 1,
                "groups": ["b", "a", "c"],
                "prefs": {"theme": "dark"},
                "frozen": [1]
            }))
            .unwrap()
    }

    #[test]
    fn test_push_and_pop() {
        let mut user = hydrated();
        let mut groups = user.list("groups").unwrap();
        assert_eq!(groups.push("d").unwrap(), 4);
        assert_eq!(groups.pop().unwrap(), Some(json!("d")));
        assert_eq!(groups.items().unwrap(), vec![json!("b"), json!("a"), json!("c")]);
        // Back at the baseline
        assert!(user.get_changes().is_empty());
        assert_eq!(user.get_change_log().len(), 2);
    }

    #[test]
    fn test_shift_unshift() {
        let mut user = hydrated();
        let mut groups = user.list("groups").unwrap();
        assert_eq!(groups.shift().unwrap(), Some(json!("b")));
        assert_eq!(groups.unshift("z").unwrap(), 3);
        assert_eq!(user.unsafe_get("groups"), Some(&json!(["z", "a", "c"])));
    }

    #[test]
    fn test_splice_clamps() {
        let mut user = hydrated();
        let mut groups = user.list("groups").unwrap();
        let removed = groups.splice(1, 10, vec![json!("x")]).unwrap();
        assert_eq!(removed, vec![json!("a"), json!("c")]);
        assert_eq!(groups.items().unwrap(), vec![json!("b"), json!("x")]);
    }

    #[test]
    fn test_sort_reverse() {
        let mut user = hydrated();
        let mut groups = user.list("groups").unwrap();
        groups.sort().unwrap();
        assert_eq!(groups.items().unwrap(), vec![json!("a"), json!("b"), json!("c")]);
        groups.reverse().unwrap();
        assert_eq!(groups.items().unwrap(), vec![json!("c"), json!("b"), json!("a")]);
        groups.sort_by(|a, b| b.as_str().cmp(&a.as_str())).unwrap();
        assert_eq!(groups.items().unwrap(), vec![json!("c"), json!("b"), json!("a")]);
    }

    #[test]
    fn test_fill_and_copy_within() {
        let mut user = hydrated();
        let mut groups = user.list("groups").unwrap();
        groups.fill("x", 1..9).unwrap();
        assert_eq!(groups.items().unwrap(), vec![json!("b"), json!("x"), json!("x")]);
        groups.copy_within(0..1, 2).unwrap();
        assert_eq!(groups.items().unwrap(), vec![json!("b"), json!("x"), json!("b")]);
    }

    #[test]
    fn test_map_mutations_commit() {
        let mut user = hydrated();
        let mut prefs = user.map("prefs").unwrap();
        assert_eq!(prefs.insert("lang", "en").unwrap(), None);
        assert_eq!(prefs.remove("theme").unwrap(), Some(json!("dark")));
        let mut extra = Map::new();
        extra.insert("tz".into(), json!("UTC"));
        prefs.assign(extra).unwrap();
        assert_eq!(prefs.get("tz").unwrap(), Some(json!("UTC")));

        let changes = user.get_changes();
        assert_eq!(
            changes["prefs"].current,
            Some(json!({"lang": "en", "tz": "UTC"}))
        );
    }

    #[test]
    fn test_non_writable_container_is_untouched() {
        let mut user = hydrated();
        let err = user.list("frozen").unwrap().push(2).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotWritable);
        assert_eq!(user.unsafe_get("frozen"), Some(&json!([1])));
    }

    #[test]
    fn test_wrong_shape() {
        let mut user = hydrated();
        let err = user.list("prefs").unwrap().push(1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SetError);
    }
}
