//! Field: the shared behavioral contract of one model attribute
//!
//! A `Field` exists once per (model type, field name) and holds no
//! per-instance state; every operation takes the model it acts on.

use serde_json::Value;

use crate::association;
use crate::model::{ErrorList, Model, ModelError, ModelResult};
use crate::schema::{Access, FieldKind, FieldMeta, FieldOptions, Generator, Mode, Validator, Verdict};

use super::equality::{is_empty_value, values_equal};
use super::globals;

/// Shared field definition bound to its model type
#[derive(Debug, Clone)]
pub struct Field {
    meta: FieldMeta,
    options: FieldOptions,
}

impl Field {
    pub fn new(meta: FieldMeta, options: FieldOptions) -> Self {
        Self { meta, options }
    }

    /// Installs the process-wide generator for a field kind
    pub fn set_global_generator(kind: FieldKind, generator: Generator) {
        globals::set_generator(kind, generator);
    }

    /// Appends a process-wide validator for a field kind
    pub fn add_global_validator(kind: FieldKind, validator: Validator) {
        globals::add_validator(kind, validator);
    }

    /// Clears every global generator and validator
    pub fn reset_globals() {
        globals::reset();
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.meta.kind
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn is_computed(&self) -> bool {
        self.options.compute.is_some()
    }

    /// Effective generator: the field's own, else the global one for its kind
    pub fn generator(&self) -> Option<Generator> {
        self.options
            .generator
            .clone()
            .or_else(|| globals::generator(&self.meta.kind))
    }

    pub fn has_generator(&self) -> bool {
        self.generator().is_some()
    }

    /// Effective validators: global ones for the kind, then the field's own
    pub fn validators(&self) -> Vec<Validator> {
        let mut validators = globals::validators(&self.meta.kind);
        validators.extend(self.options.validators.iter().cloned());
        validators
    }

    /// Reads the value, enforcing readability, initialization and validity
    pub fn get(&self, model: &Model) -> ModelResult<Value> {
        if !self.is_readable(model) {
            return Err(ModelError::not_readable(&self.meta));
        }
        let value = self
            .unsafe_get(model)
            .ok_or_else(|| ModelError::not_initialized(&self.meta))?;

        let errors = self.check(model, value, false);
        if !errors.is_empty() {
            return Err(ModelError::ValidatorsFailed {
                model: self.meta.model.clone(),
                field: self.meta.name.clone(),
                errors,
            });
        }
        Ok(value.clone())
    }

    /// Raw read; absent means uninitialized
    pub fn unsafe_get<'m>(&self, model: &'m Model) -> Option<&'m Value> {
        model.state_value(&self.meta.name)
    }

    /// Writes the value, enforcing writability and nullability
    pub fn set(&self, model: &mut Model, value: Value) -> ModelResult<()> {
        if !self.is_writable(model) {
            return Err(ModelError::not_writable(&self.meta));
        }
        if value.is_null() && !self.options.nullable {
            return Err(ModelError::not_nullable(&self.meta));
        }
        model.commit(&self.meta.name, value);
        Ok(())
    }

    /// Serializes `value` and writes it
    pub fn set_typed<T: serde::Serialize>(&self, model: &mut Model, value: &T) -> ModelResult<()> {
        let value = serde_json::to_value(value).map_err(|e| ModelError::SetError {
            model: self.meta.model.clone(),
            field: self.meta.name.clone(),
            reason: e.to_string(),
        })?;
        self.set(model, value)
    }

    /// Removes the value and erases the field's change history
    pub fn unset(&self, model: &mut Model) {
        model.erase(&self.meta.name);
    }

    /// Deep equality against the stored value
    pub fn is(&self, model: &Model, value: &Value) -> bool {
        self.unsafe_get(model)
            .is_some_and(|current| values_equal(current, value))
    }

    pub fn is_empty(&self, model: &Model) -> bool {
        is_empty_value(self.unsafe_get(model))
    }

    pub fn is_present(&self, model: &Model) -> bool {
        !self.is_empty(model)
    }

    pub fn is_valid(&self, model: &Model) -> bool {
        self.validate(model).is_empty()
    }

    /// Runs every validator, eager and lazy; absent values are skipped
    pub fn validate(&self, model: &Model) -> ErrorList {
        match self.unsafe_get(model) {
            Some(value) => self.check(model, value, false),
            None => ErrorList::new(),
        }
    }

    /// Nullability and eager validators, as run during construction
    pub(crate) fn validate_eager(&self, model: &Model) -> ErrorList {
        match self.unsafe_get(model) {
            Some(value) => self.check(model, value, true),
            None => ErrorList::new(),
        }
    }

    fn check(&self, model: &Model, value: &Value, eager_only: bool) -> ErrorList {
        let mut errors = ErrorList::new();

        if value.is_null() {
            if !self.options.nullable {
                errors.push(ModelError::not_nullable(&self.meta));
            }
            return errors;
        }

        // Later validators assume the declared shape
        if !self.meta.kind.accepts(value) {
            errors.push(self.validator_failed(
                "type",
                Some(format!("expected {}", self.meta.kind)),
            ));
            return errors;
        }

        for validator in self.validators() {
            if eager_only && validator.mode() == Mode::Lazy {
                continue;
            }
            match validator.check(value, model) {
                Verdict::Pass => {}
                Verdict::Fail => errors.push(self.validator_failed(validator.name(), None)),
                Verdict::Message(message) => {
                    errors.push(self.validator_failed(validator.name(), Some(message)))
                }
            }
        }

        if self.options.associate.is_some() {
            match association::validator(&self.meta.model, &self.meta.name) {
                None => errors.push(ModelError::association_validator_not_found(&self.meta)),
                Some(consistent) if !consistent(model, value) => {
                    errors.push(ModelError::AssociationInvalid {
                        model: self.meta.model.clone(),
                        field: self.meta.name.clone(),
                        target: self.meta.kind.target().unwrap_or_default().to_string(),
                    });
                }
                Some(_) => {}
            }
        }

        errors
    }

    fn validator_failed(&self, validator: &str, message: Option<String>) -> ModelError {
        ModelError::FieldValidatorFailed {
            model: self.meta.model.clone(),
            field: self.meta.name.clone(),
            validator: validator.to_string(),
            message,
        }
    }

    /// Produces a value for a new entity's uninitialized field
    pub fn generate(&self, model: &mut Model) -> ModelResult<()> {
        let generator = self
            .generator()
            .ok_or_else(|| ModelError::no_generator(&self.meta))?;
        if self.unsafe_get(model).is_some() {
            return Err(ModelError::already_generated(&self.meta));
        }
        if model.is_existing() {
            return Err(ModelError::cannot_generate_existing(&self.meta));
        }
        self.set(model, generator.produce())
    }

    /// Derives the value, commits it when it changed, and reads it back
    pub fn compute(&self, model: &mut Model) -> ModelResult<Value> {
        let compute = self
            .options
            .compute
            .as_ref()
            .ok_or_else(|| ModelError::no_compute(&self.meta))?;
        let value = compute.derive(model);
        if !self.is(model, &value) {
            self.set(model, value)?;
        }
        self.get(model)
    }

    pub fn is_readable(&self, model: &Model) -> bool {
        self.allows(&self.options.readable, model)
    }

    pub fn is_writable(&self, model: &Model) -> bool {
        self.allows(&self.options.writable, model)
    }

    fn allows(&self, access: &Access, model: &Model) -> bool {
        match access {
            Access::Allow(allowed) => *allowed,
            // Predicate errors deny
            Access::Rule(rule) => {
                let ctx = model.context();
                rule(&ctx, model, self.unsafe_get(model)).unwrap_or(false)
            }
        }
    }
}
