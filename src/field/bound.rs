//! Per-instance field accessor

use std::sync::Arc;

use serde_json::Value;

use crate::model::{ErrorList, Model, ModelResult};
use crate::schema::{FieldMeta, FieldOptions};

use super::field::Field;

/// A `Field` bound to one model instance.
///
/// Obtained through `Model::field`; every call forwards to the shared field
/// with the captured model.
pub struct BoundField<'m> {
    model: &'m mut Model,
    field: Arc<Field>,
}

impl<'m> BoundField<'m> {
    pub(crate) fn new(model: &'m mut Model, field: Arc<Field>) -> Self {
        Self { model, field }
    }

    pub fn name(&self) -> &str {
        self.field.name()
    }

    pub fn meta(&self) -> &FieldMeta {
        self.field.meta()
    }

    pub fn options(&self) -> &FieldOptions {
        self.field.options()
    }

    pub fn get(&self) -> ModelResult<Value> {
        self.field.get(self.model)
    }

    pub fn unsafe_get(&self) -> Option<&Value> {
        self.field.unsafe_get(self.model)
    }

    pub fn set(&mut self, value: impl Into<Value>) -> ModelResult<()> {
        self.field.set(self.model, value.into())
    }

    pub fn unset(&mut self) {
        self.field.unset(self.model);
    }

    pub fn is(&self, value: &Value) -> bool {
        self.field.is(self.model, value)
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty(self.model)
    }

    pub fn is_present(&self) -> bool {
        self.field.is_present(self.model)
    }

    pub fn is_valid(&self) -> bool {
        self.field.is_valid(self.model)
    }

    pub fn validate(&self) -> ErrorList {
        self.field.validate(self.model)
    }

    pub fn generate(&mut self) -> ModelResult<()> {
        self.field.generate(self.model)
    }

    pub fn compute(&mut self) -> ModelResult<Value> {
        self.field.compute(self.model)
    }

    pub fn is_readable(&self) -> bool {
        self.field.is_readable(self.model)
    }

    pub fn is_writable(&self) -> bool {
        self.field.is_writable(self.model)
    }
}
