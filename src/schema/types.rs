//! Field definition types
//!
//! Field kinds:
//! - any: no intrinsic constraint
//! - id: string or integer identifier
//! - string, number, integer, boolean
//! - date: RFC 3339 timestamp string
//! - array, object: JSON containers
//! - model: embedded related model (object), names its target model
//! - custom: user-named kind with no intrinsic constraint

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::model::Model;

/// Field kind, used for the intrinsic type check and to key the global
/// generator/validator registries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Any,
    Id,
    String,
    Number,
    Integer,
    Boolean,
    Date,
    Array,
    Object,
    /// Embedded related model, by target model name
    Model(String),
    /// User-defined kind
    Custom(String),
}

impl FieldKind {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::Any => "any",
            FieldKind::Id => "id",
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
            FieldKind::Model(_) => "model",
            FieldKind::Custom(name) => name,
        }
    }

    /// Returns true if `value` has the shape this kind requires.
    ///
    /// `null` is handled by the nullability rule, never here.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Any | FieldKind::Custom(_) => true,
            FieldKind::Id => value.is_string() || value.is_i64() || value.is_u64(),
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Date => value
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
            FieldKind::Array => value.is_array(),
            FieldKind::Object | FieldKind::Model(_) => value.is_object(),
        }
    }

    /// Target model name for `Model` kinds
    pub fn target(&self) -> Option<&str> {
        match self {
            FieldKind::Model(target) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Model(target) => write!(f, "model<{}>", target),
            other => write!(f, "{}", other.type_name()),
        }
    }
}

/// Identity of a field: owning model, name and kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    pub model: String,
    pub name: String,
    pub kind: FieldKind,
}

impl FieldMeta {
    pub fn new(model: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            model: model.into(),
            name: name.into(),
            kind,
        }
    }
}

/// When a generator, compute or validator runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Runs automatically during construction
    #[default]
    Eager,
    /// Runs only when explicitly invoked
    Lazy,
}

/// Error type accepted from user predicates
pub type RuleError = Box<dyn std::error::Error + Send + Sync>;

/// Result of an access or permission predicate
pub type RuleResult = Result<bool, RuleError>;

/// Conversion of predicate return values into a `RuleResult`
pub trait IntoRuleResult {
    fn into_rule_result(self) -> RuleResult;
}

impl IntoRuleResult for bool {
    fn into_rule_result(self) -> RuleResult {
        Ok(self)
    }
}

impl<E: Into<RuleError>> IntoRuleResult for Result<bool, E> {
    fn into_rule_result(self) -> RuleResult {
        self.map_err(Into::into)
    }
}

/// Access predicate: (context, model, current value) -> allowed
pub type AccessRule = Arc<dyn Fn(&Context, &Model, Option<&Value>) -> RuleResult + Send + Sync>;

/// Readability or writability of a field
#[derive(Clone)]
pub enum Access {
    Allow(bool),
    Rule(AccessRule),
}

impl Default for Access {
    fn default() -> Self {
        Access::Allow(true)
    }
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Allow(allowed) => write!(f, "Allow({})", allowed),
            Access::Rule(_) => write!(f, "Rule(..)"),
        }
    }
}

/// Outcome of a single validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// Failure with an explanation
    Message(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

impl From<&str> for Verdict {
    fn from(message: &str) -> Self {
        Verdict::Message(message.to_string())
    }
}

impl From<String> for Verdict {
    fn from(message: String) -> Self {
        Verdict::Message(message)
    }
}

impl From<Result<(), String>> for Verdict {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Verdict::Pass,
            Err(message) => Verdict::Message(message),
        }
    }
}

type CheckFn = Arc<dyn Fn(&Value, &Model) -> Verdict + Send + Sync>;

/// Named validator
#[derive(Clone)]
pub struct Validator {
    name: String,
    mode: Mode,
    check: CheckFn,
}

impl Validator {
    pub fn new<F, R>(name: impl Into<String>, mode: Mode, check: F) -> Self
    where
        F: Fn(&Value, &Model) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self {
            name: name.into(),
            mode,
            check: Arc::new(move |value, model| check(value, model).into()),
        }
    }

    pub fn eager<F, R>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &Model) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self::new(name, Mode::Eager, check)
    }

    pub fn lazy<F, R>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &Model) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self::new(name, Mode::Lazy, check)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn check(&self, value: &Value, model: &Model) -> Verdict {
        (self.check)(value, model)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish()
    }
}

type ProduceFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Value producer for new entities
#[derive(Clone)]
pub struct Generator {
    mode: Mode,
    produce: ProduceFn,
}

impl Generator {
    pub fn new<F, V>(mode: Mode, produce: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self {
            mode,
            produce: Arc::new(move || produce().into()),
        }
    }

    pub fn eager<F, V>(produce: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::new(Mode::Eager, produce)
    }

    pub fn lazy<F, V>(produce: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::new(Mode::Lazy, produce)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn produce(&self) -> Value {
        (self.produce)()
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator").field("mode", &self.mode).finish()
    }
}

/// Default value: a constant or a producer
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Producer(ProduceFn),
}

impl DefaultValue {
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Producer(produce) => produce(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(value) => write!(f, "Value({})", value),
            DefaultValue::Producer(_) => write!(f, "Producer(..)"),
        }
    }
}

type DeriveFn = Arc<dyn Fn(&Model) -> Value + Send + Sync>;

/// Derivation of a field from the rest of the model
#[derive(Clone)]
pub struct Compute {
    mode: Mode,
    derive: DeriveFn,
}

impl Compute {
    pub fn new<F, V>(mode: Mode, derive: F) -> Self
    where
        F: Fn(&Model) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self {
            mode,
            derive: Arc::new(move |model| derive(model).into()),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn derive(&self, model: &Model) -> Value {
        (self.derive)(model)
    }
}

impl fmt::Debug for Compute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compute").field("mode", &self.mode).finish()
    }
}

/// Cross-model key matching rule.
///
/// `from` is a dot path on the embedded related value, `to` a dot path on
/// the owning model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Associate {
    pub from: String,
    pub to: String,
}

/// Accumulated options of one field
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    pub nullable: bool,
    pub readable: Access,
    pub writable: Access,
    pub default: Option<DefaultValue>,
    pub generator: Option<Generator>,
    pub compute: Option<Compute>,
    pub validators: Vec<Validator>,
    pub associate: Option<Associate>,
}
