//! Model instance: the aggregate root
//!
//! Holds the authoritative field state, the change log and the hydration
//! baseline. All field access goes through the accessor methods here or
//! through a `BoundField`; there is no direct access to `state`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::auth;
use crate::context::{self, Context};
use crate::field::{BoundField, Field};
use crate::schema::ModelSchema;

use super::changes::{Change, ChangeLog};
use super::errors::{ErrorList, ModelError, ModelResult};
use super::initializer::Initializer;
use super::tracked::{TrackedList, TrackedMap};

/// Live, validated instance of a model type
#[derive(Clone)]
pub struct Model {
    pub(super) schema: Arc<ModelSchema>,
    pub(super) fields: HashMap<String, Arc<Field>>,
    pub(super) state: HashMap<String, Value>,
    pub(super) initial_state: HashMap<String, Value>,
    pub(super) change_log: ChangeLog,
    pub(super) initializer: Initializer,
    pub(super) context: Option<Context>,
}

impl Model {
    /// Instances only come from `make` or `from`
    pub fn new(schema: &Arc<ModelSchema>) -> ModelResult<Model> {
        Err(ModelError::DirectInstantiationNotAllowed {
            model: schema.name().to_string(),
        })
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// Model type name
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn initializer(&self) -> Initializer {
        self.initializer
    }

    pub fn is_new(&self) -> bool {
        self.initializer == Initializer::Make
    }

    pub fn is_existing(&self) -> bool {
        self.initializer == Initializer::From
    }

    /// Value of the ID field, if initialized
    pub fn id(&self) -> Option<&Value> {
        self.state.get(self.schema.id_field())
    }

    // ---- context ----

    /// Instance override, else the ambient context, else anonymous
    pub fn context(&self) -> Context {
        self.context
            .clone()
            .or_else(context::current)
            .unwrap_or_default()
    }

    pub fn with_context(mut self, ctx: Context) -> Self {
        self.context = Some(ctx);
        self
    }

    pub fn set_context(&mut self, ctx: Option<Context>) {
        self.context = ctx;
    }

    // ---- state plumbing used by Field ----

    pub(crate) fn state_value(&self, name: &str) -> Option<&Value> {
        self.state.get(name)
    }

    /// Logs the mutation, then stores the value
    pub(crate) fn commit(&mut self, name: &str, value: Value) {
        let previous = self.state.get(name).cloned();
        self.change_log.record(name, previous, Some(value.clone()));
        self.state.insert(name.to_string(), value);
    }

    /// Drops the value together with its change history
    pub(crate) fn erase(&mut self, name: &str) {
        self.change_log.erase(name);
        self.state.remove(name);
    }

    fn binding(&self, name: &str) -> ModelResult<Arc<Field>> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::unknown_field(self.name(), name))
    }

    /// Resolves `keys`, or every field in declaration order
    fn select(&self, keys: Option<&[&str]>) -> ModelResult<Vec<Arc<Field>>> {
        match keys {
            Some(keys) => keys.iter().map(|key| self.binding(key)).collect(),
            None => Ok(self.schema.fields().to_vec()),
        }
    }

    // ---- accessors ----

    /// Per-instance accessor for one field
    pub fn field(&mut self, name: &str) -> ModelResult<BoundField<'_>> {
        let field = self.binding(name)?;
        Ok(BoundField::new(self, field))
    }

    /// Public read. Computed fields are derived afresh on every read.
    pub fn get(&mut self, name: &str) -> ModelResult<Value> {
        let field = self.binding(name)?;
        if field.is_computed() {
            field.compute(self)
        } else {
            field.get(self)
        }
    }

    /// Public write
    pub fn assign(&mut self, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        let field = self.binding(name)?;
        if field.is_computed() {
            return Err(ModelError::field_is_computed(field.meta()));
        }
        if !field.is_writable(self) {
            return Err(ModelError::not_writable(field.meta()));
        }
        field.set(self, value.into())
    }

    /// Raw read, bypassing access rules and validation
    pub fn unsafe_get(&self, name: &str) -> Option<&Value> {
        self.state.get(name)
    }

    /// Tracked view over an array field; every mutation re-commits the array
    pub fn list(&mut self, name: &str) -> ModelResult<TrackedList<'_>> {
        let field = self.tracked_binding(name)?;
        Ok(TrackedList::new(self, field))
    }

    /// Tracked view over an object field; every mutation re-commits the object
    pub fn map(&mut self, name: &str) -> ModelResult<TrackedMap<'_>> {
        let field = self.tracked_binding(name)?;
        Ok(TrackedMap::new(self, field))
    }

    fn tracked_binding(&self, name: &str) -> ModelResult<Arc<Field>> {
        let field = self.binding(name)?;
        if field.is_computed() {
            return Err(ModelError::field_is_computed(field.meta()));
        }
        Ok(field)
    }

    // ---- changes ----

    /// Net changes since construction, keyed by field
    pub fn get_changes(&self) -> BTreeMap<String, Change> {
        self.change_log.net_changes(&self.initial_state)
    }

    /// Every recorded change, newest first
    pub fn get_change_log(&self) -> Vec<Change> {
        self.change_log.newest_first()
    }

    // ---- bulk operations ----

    /// Runs eager and lazy validators of all or the given fields
    pub fn validate(&self, keys: Option<&[&str]>) -> ModelResult<ErrorList> {
        let mut errors = ErrorList::new();
        for field in self.select(keys)? {
            errors.merge(field.validate(self));
        }
        Ok(errors)
    }

    /// Generates every uninitialized field that has a generator
    pub fn generate(&mut self, keys: Option<&[&str]>) -> ModelResult<()> {
        for field in self.select(keys)? {
            if field.has_generator() && field.unsafe_get(self).is_none() {
                field.generate(self)?;
            }
        }
        Ok(())
    }

    /// Writes every entry of `data`; `null` is a value and is applied
    pub fn set(&mut self, data: &Map<String, Value>) -> ModelResult<()> {
        for (key, value) in data {
            let field = self.binding(key)?;
            field.set(self, value.clone())?;
        }
        Ok(())
    }

    pub fn unset(&mut self, keys: &[&str]) -> ModelResult<()> {
        for field in self.select(Some(keys))? {
            field.unset(self);
        }
        Ok(())
    }

    /// Unsets every field not named in `keys`; the ID field is always kept
    pub fn only(&mut self, keys: &[&str]) -> ModelResult<()> {
        self.select(Some(keys))?;
        let id_field = self.schema.id_field().to_string();
        let dropped: Vec<Arc<Field>> = self
            .schema
            .fields()
            .iter()
            .filter(|field| field.name() != id_field && !keys.iter().any(|key| *key == field.name()))
            .cloned()
            .collect();
        for field in dropped {
            field.unset(self);
        }
        Ok(())
    }

    /// Unsets every field named in `keys`; naming the ID field is an error
    pub fn except(&mut self, keys: &[&str]) -> ModelResult<()> {
        let id_field = self.schema.id_field();
        if keys.iter().any(|key| *key == id_field) {
            return Err(ModelError::IdFieldCannotBeExcluded {
                model: self.name().to_string(),
                field: id_field.to_string(),
            });
        }
        self.unset(keys)
    }

    // ---- predicates ----

    pub fn is_valid(&self, name: &str) -> ModelResult<bool> {
        Ok(self.binding(name)?.is_valid(self))
    }

    pub fn is_empty(&self, name: &str) -> ModelResult<bool> {
        Ok(self.binding(name)?.is_empty(self))
    }

    pub fn is_present(&self, name: &str) -> ModelResult<bool> {
        Ok(self.binding(name)?.is_present(self))
    }

    /// True if every selected field is valid
    pub fn has_valid(&self, keys: Option<&[&str]>) -> ModelResult<bool> {
        Ok(self.select(keys)?.iter().all(|field| field.is_valid(self)))
    }

    /// True if every selected field is empty
    pub fn has_empty(&self, keys: Option<&[&str]>) -> ModelResult<bool> {
        Ok(self.select(keys)?.iter().all(|field| field.is_empty(self)))
    }

    /// True if every selected field is present
    pub fn has_present(&self, keys: Option<&[&str]>) -> ModelResult<bool> {
        Ok(self.select(keys)?.iter().all(|field| field.is_present(self)))
    }

    // ---- authorization ----

    /// Checks the permission registered for `method`
    pub fn authorize(&self, method: &str) -> ModelResult<()> {
        auth::check(self, method)
    }

    /// Runs `f` once `method` is authorized
    pub fn call<T>(
        &mut self,
        method: &str,
        f: impl FnOnce(&mut Model) -> ModelResult<T>,
    ) -> ModelResult<T> {
        self.authorize(method)?;
        f(self)
    }

    // ---- serialization ----

    /// Readable, initialized fields as a JSON object
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for field in self.schema.fields() {
            let Some(value) = self.state.get(field.name()) else {
                continue;
            };
            if field.is_readable(self) {
                out.insert(field.name().to_string(), value.clone());
            }
        }
        Value::Object(out)
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("model", &self.name())
            .field("initializer", &self.initializer)
            .field("state", &self.state)
            .field("changes", &self.change_log.len())
            .finish()
    }
}
