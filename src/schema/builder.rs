//! Field builders
//!
//! One builder type for every kind; the factory function fixes the kind and
//! the chained calls accumulate options.
//!
//! ```ignore
//! let email = string()
//!     .validate("email", |v, _| v.as_str().is_some_and(|s| s.contains('@')))
//!     .writable_when(|ctx, _, _| ctx.has_role("admin"));
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::field::Field;
use crate::model::Model;

use super::types::{
    Access, Associate, Compute, DefaultValue, FieldKind, FieldMeta, FieldOptions, Generator,
    IntoRuleResult, Mode, Validator, Verdict,
};

/// Accumulates the options of one field
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    kind: FieldKind,
    options: FieldOptions,
}

impl FieldBuilder {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            options: FieldOptions::default(),
        }
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Allows `null` values
    pub fn nullable(mut self) -> Self {
        self.options.nullable = true;
        self
    }

    pub fn readable(mut self, readable: bool) -> Self {
        self.options.readable = Access::Allow(readable);
        self
    }

    /// Readability decided per read from (context, model, current value)
    pub fn readable_when<F, R>(mut self, rule: F) -> Self
    where
        F: Fn(&Context, &Model, Option<&Value>) -> R + Send + Sync + 'static,
        R: IntoRuleResult,
    {
        self.options.readable =
            Access::Rule(Arc::new(move |ctx, model, value| rule(ctx, model, value).into_rule_result()));
        self
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.options.writable = Access::Allow(writable);
        self
    }

    /// Writability decided per write from (context, model, current value)
    pub fn writable_when<F, R>(mut self, rule: F) -> Self
    where
        F: Fn(&Context, &Model, Option<&Value>) -> R + Send + Sync + 'static,
        R: IntoRuleResult,
    {
        self.options.writable =
            Access::Rule(Arc::new(move |ctx, model, value| rule(ctx, model, value).into_rule_result()));
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.options.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Default produced fresh for every new entity
    pub fn default_with<F, V>(mut self, produce: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.options.default = Some(DefaultValue::Producer(Arc::new(move || produce().into())));
        self
    }

    /// Eager generator, fired when a new entity is made
    pub fn generate<F, V>(mut self, produce: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.options.generator = Some(Generator::eager(produce));
        self
    }

    /// Generator fired only through an explicit `generate` call
    pub fn generate_lazy<F, V>(mut self, produce: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.options.generator = Some(Generator::lazy(produce));
        self
    }

    pub fn generator(mut self, generator: Generator) -> Self {
        self.options.generator = Some(generator);
        self
    }

    /// Computed on read
    pub fn compute<F, V>(mut self, derive: F) -> Self
    where
        F: Fn(&Model) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.options.compute = Some(Compute::new(Mode::Lazy, derive));
        self
    }

    /// Computed on read and once during construction
    pub fn compute_eager<F, V>(mut self, derive: F) -> Self
    where
        F: Fn(&Model) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.options.compute = Some(Compute::new(Mode::Eager, derive));
        self
    }

    pub fn validate<F, R>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &Model) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        self.options.validators.push(Validator::eager(name, check));
        self
    }

    /// Validator skipped during construction
    pub fn validate_lazy<F, R>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &Model) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        self.options.validators.push(Validator::lazy(name, check));
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.options.validators.push(validator);
        self
    }

    /// Requires `from` on the embedded value to equal `to` on the owner
    pub fn associate(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.options.associate = Some(Associate {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Materializes the shared field for `model.name`
    pub fn to_field(&self, model: &str, name: &str) -> Field {
        Field::new(
            FieldMeta::new(model, name, self.kind.clone()),
            self.options.clone(),
        )
    }
}

pub fn any() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Any)
}

pub fn id() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Id)
}

pub fn string() -> FieldBuilder {
    FieldBuilder::new(FieldKind::String)
}

pub fn number() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Number)
}

pub fn integer() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Integer)
}

pub fn boolean() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Boolean)
}

pub fn date() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Date)
}

pub fn array() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Array)
}

pub fn object() -> FieldBuilder {
    FieldBuilder::new(FieldKind::Object)
}

/// Embedded related model named `target`
pub fn related(target: impl Into<String>) -> FieldBuilder {
    FieldBuilder::new(FieldKind::Model(target.into()))
}

/// Field of a user-defined kind
pub fn custom(kind: impl Into<String>) -> FieldBuilder {
    FieldBuilder::new(FieldKind::Custom(kind.into()))
}
