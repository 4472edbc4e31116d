//! Instantiation protocol
//!
//! `make` builds a new entity, `from` hydrates an existing one. Both run
//! the same phases:
//!
//! 1. bind one shared `Field` per schema entry
//! 2. seed values (input, then for `make` only: default, eager generator),
//!    then derive eager computed fields
//! 3. validate every initialized field (nullability, eager validators,
//!    associations), aggregating all failures
//! 4. seed the change log (`make`) or snapshot the baseline (`from`)
//!
//! Seeding writes straight into state: access rules are not consulted
//! until construction completes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field::json_type_name;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{Mode, ModelSchema};

use super::changes::ChangeLog;
use super::errors::{ErrorList, ModelError, ModelResult};
use super::model::Model;

/// How an instance came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Initializer {
    /// New entity: defaults and generators apply
    Make,
    /// Existing entity: input is taken as-is
    From,
}

impl Initializer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Initializer::Make => "make",
            Initializer::From => "from",
        }
    }
}

impl Model {
    /// Constructs a new entity from `data`
    pub fn make(schema: &Arc<ModelSchema>, data: Value) -> ModelResult<Model> {
        Self::initialize(schema, data, Initializer::Make)
    }

    /// Hydrates an existing entity from `data`
    #[allow(clippy::should_implement_trait)]
    pub fn from(schema: &Arc<ModelSchema>, data: Value) -> ModelResult<Model> {
        Self::initialize(schema, data, Initializer::From)
    }

    fn initialize(
        schema: &Arc<ModelSchema>,
        data: Value,
        initializer: Initializer,
    ) -> ModelResult<Model> {
        let input = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ModelError::InvalidInput {
                    model: schema.name().to_string(),
                    reason: format!("expected an object, got {}", json_type_name(&other)),
                })
            }
        };

        let mut model = Model {
            schema: Arc::clone(schema),
            fields: HashMap::with_capacity(schema.fields().len()),
            state: HashMap::new(),
            initial_state: HashMap::new(),
            change_log: ChangeLog::default(),
            initializer,
            context: None,
        };

        model.bind_fields();
        model.seed(&input);

        let errors = model.validate_construction();
        if !errors.is_empty() {
            let count = errors.len().to_string();
            log_event_with_fields(
                Event::ModelRejected,
                &[
                    ("errors", &count),
                    ("initializer", initializer.as_str()),
                    ("model", schema.name()),
                ],
            );
            return Err(ModelError::ModelFieldValidationFailed {
                model: schema.name().to_string(),
                errors,
            });
        }

        model.seed_history();

        let event = match initializer {
            Initializer::Make => Event::ModelMade,
            Initializer::From => Event::ModelHydrated,
        };
        log_event_with_fields(event, &[("model", schema.name())]);
        Ok(model)
    }

    fn bind_fields(&mut self) {
        for field in self.schema.fields() {
            self.fields
                .entry(field.name().to_string())
                .or_insert_with(|| Arc::clone(field));
        }
    }

    fn seed(&mut self, input: &Map<String, Value>) {
        for key in input.keys() {
            if !self.schema.has_field(key) {
                log_event_with_fields(
                    Event::UnknownInputKey,
                    &[("key", key), ("model", self.schema.name())],
                );
            }
        }

        let schema = Arc::clone(&self.schema);
        for field in schema.fields().iter().filter(|f| !f.is_computed()) {
            let value = match input.get(field.name()) {
                Some(value) => Some(value.clone()),
                None if self.initializer == Initializer::From => None,
                None => match &field.options().default {
                    Some(default) => Some(default.resolve()),
                    None => field
                        .generator()
                        .filter(|generator| generator.mode() == Mode::Eager)
                        .map(|generator| generator.produce()),
                },
            };
            if let Some(value) = value {
                self.state.insert(field.name().to_string(), value);
            }
        }

        // Derived after every plain field is in place
        for field in schema.fields() {
            let Some(compute) = field.options().compute.as_ref() else {
                continue;
            };
            if compute.mode() == Mode::Eager {
                let value = compute.derive(self);
                self.state.insert(field.name().to_string(), value);
            }
        }
    }

    fn validate_construction(&self) -> ErrorList {
        let mut errors = ErrorList::new();
        for field in self.schema.fields() {
            errors.merge(field.validate_eager(self));
        }
        errors
    }

    fn seed_history(&mut self) {
        match self.initializer {
            Initializer::Make => {
                let schema = Arc::clone(&self.schema);
                for field in schema.fields() {
                    if let Some(value) = self.state.get(field.name()) {
                        self.change_log
                            .record(field.name(), None, Some(value.clone()));
                    }
                }
            }
            Initializer::From => {
                self.initial_state = self.state.clone();
            }
        }
    }
}
