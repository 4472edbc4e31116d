//! Model error taxonomy
//!
//! Every error carries structured parameters (model, field, validator, ...)
//! for message templating. Rendered text comes from the message registry, so
//! it can be overridden; `code()` is stable and always available.

use std::fmt;

use crate::context::ContextError;
use crate::messages;
use crate::schema::FieldMeta;

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Field access rules and generator/compute availability
    Access,
    /// Nullability, validators and associations
    Validation,
    /// Instantiation protocol and schema declaration
    Construction,
    /// Model-level invariants
    Invariant,
    /// Guarded method calls
    Authorization,
    /// Ambient context storage
    Context,
}

/// Stable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotReadable,
    NotWritable,
    FieldIsComputed,
    NoGenerator,
    NoCompute,
    AlreadyGenerated,
    CannotGenerateExisting,
    NotInitialized,
    ValidatorsFailed,
    UnknownField,
    SetError,
    NotNullable,
    FieldValidatorFailed,
    AssociationInvalid,
    AssociationValidatorNotFound,
    DirectInstantiationNotAllowed,
    ModelFieldValidationFailed,
    InvalidInput,
    InvalidSchema,
    IdFieldCannotBeExcluded,
    UnauthorizedMethodCall,
    ContextMisconfigured,
}

impl ErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::NotReadable => "AERO_MODEL_NOT_READABLE",
            ErrorCode::NotWritable => "AERO_MODEL_NOT_WRITABLE",
            ErrorCode::FieldIsComputed => "AERO_MODEL_FIELD_IS_COMPUTED",
            ErrorCode::NoGenerator => "AERO_MODEL_NO_GENERATOR",
            ErrorCode::NoCompute => "AERO_MODEL_NO_COMPUTE",
            ErrorCode::AlreadyGenerated => "AERO_MODEL_ALREADY_GENERATED",
            ErrorCode::CannotGenerateExisting => "AERO_MODEL_CANNOT_GENERATE_EXISTING",
            ErrorCode::NotInitialized => "AERO_MODEL_NOT_INITIALIZED",
            ErrorCode::ValidatorsFailed => "AERO_MODEL_VALIDATORS_FAILED",
            ErrorCode::UnknownField => "AERO_MODEL_UNKNOWN_FIELD",
            ErrorCode::SetError => "AERO_MODEL_SET_ERROR",
            ErrorCode::NotNullable => "AERO_MODEL_NOT_NULLABLE",
            ErrorCode::FieldValidatorFailed => "AERO_MODEL_FIELD_VALIDATOR_FAILED",
            ErrorCode::AssociationInvalid => "AERO_MODEL_ASSOCIATION_INVALID",
            ErrorCode::AssociationValidatorNotFound => {
                "AERO_MODEL_ASSOCIATION_VALIDATOR_NOT_FOUND"
            }
            ErrorCode::DirectInstantiationNotAllowed => {
                "AERO_MODEL_DIRECT_INSTANTIATION_NOT_ALLOWED"
            }
            ErrorCode::ModelFieldValidationFailed => "AERO_MODEL_FIELD_VALIDATION_FAILED",
            ErrorCode::InvalidInput => "AERO_MODEL_INVALID_INPUT",
            ErrorCode::InvalidSchema => "AERO_MODEL_INVALID_SCHEMA",
            ErrorCode::IdFieldCannotBeExcluded => "AERO_MODEL_ID_FIELD_CANNOT_BE_EXCLUDED",
            ErrorCode::UnauthorizedMethodCall => "AERO_MODEL_UNAUTHORIZED_METHOD_CALL",
            ErrorCode::ContextMisconfigured => "AERO_MODEL_CONTEXT_MISCONFIGURED",
        }
    }

    /// Returns the category of this code
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::NotReadable
            | ErrorCode::NotWritable
            | ErrorCode::FieldIsComputed
            | ErrorCode::NoGenerator
            | ErrorCode::NoCompute
            | ErrorCode::AlreadyGenerated
            | ErrorCode::CannotGenerateExisting
            | ErrorCode::NotInitialized
            | ErrorCode::ValidatorsFailed
            | ErrorCode::UnknownField
            | ErrorCode::SetError => ErrorCategory::Access,
            ErrorCode::NotNullable
            | ErrorCode::FieldValidatorFailed
            | ErrorCode::AssociationInvalid
            | ErrorCode::AssociationValidatorNotFound => ErrorCategory::Validation,
            ErrorCode::DirectInstantiationNotAllowed
            | ErrorCode::ModelFieldValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::InvalidSchema => ErrorCategory::Construction,
            ErrorCode::IdFieldCannotBeExcluded => ErrorCategory::Invariant,
            ErrorCode::UnauthorizedMethodCall => ErrorCategory::Authorization,
            ErrorCode::ContextMisconfigured => ErrorCategory::Context,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Model runtime error
#[derive(Debug, Clone)]
pub enum ModelError {
    NotReadable { model: String, field: String },
    NotWritable { model: String, field: String },
    FieldIsComputed { model: String, field: String },
    NoGenerator { model: String, field: String },
    NoCompute { model: String, field: String },
    AlreadyGenerated { model: String, field: String },
    CannotGenerateExisting { model: String, field: String },
    NotInitialized { model: String, field: String },
    ValidatorsFailed { model: String, field: String, errors: ErrorList },
    UnknownField { model: String, field: String },
    SetError { model: String, field: String, reason: String },
    NotNullable { model: String, field: String },
    FieldValidatorFailed {
        model: String,
        field: String,
        validator: String,
        message: Option<String>,
    },
    AssociationInvalid { model: String, field: String, target: String },
    AssociationValidatorNotFound { model: String, field: String },
    DirectInstantiationNotAllowed { model: String },
    ModelFieldValidationFailed { model: String, errors: ErrorList },
    InvalidInput { model: String, reason: String },
    InvalidSchema { model: String, reason: String },
    IdFieldCannotBeExcluded { model: String, field: String },
    UnauthorizedMethodCall { model: String, method: String },
    Context(ContextError),
}

macro_rules! field_error_ctor {
    ($($fn_name:ident => $variant:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name(meta: &FieldMeta) -> Self {
                ModelError::$variant {
                    model: meta.model.clone(),
                    field: meta.name.clone(),
                }
            }
        )*
    };
}

impl ModelError {
    field_error_ctor! {
        not_readable => NotReadable,
        not_writable => NotWritable,
        field_is_computed => FieldIsComputed,
        no_generator => NoGenerator,
        no_compute => NoCompute,
        already_generated => AlreadyGenerated,
        cannot_generate_existing => CannotGenerateExisting,
        not_initialized => NotInitialized,
        not_nullable => NotNullable,
        association_validator_not_found => AssociationValidatorNotFound,
    }

    pub(crate) fn unknown_field(model: &str, field: &str) -> Self {
        ModelError::UnknownField {
            model: model.to_string(),
            field: field.to_string(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            ModelError::NotReadable { .. } => ErrorCode::NotReadable,
            ModelError::NotWritable { .. } => ErrorCode::NotWritable,
            ModelError::FieldIsComputed { .. } => ErrorCode::FieldIsComputed,
            ModelError::NoGenerator { .. } => ErrorCode::NoGenerator,
            ModelError::NoCompute { .. } => ErrorCode::NoCompute,
            ModelError::AlreadyGenerated { .. } => ErrorCode::AlreadyGenerated,
            ModelError::CannotGenerateExisting { .. } => ErrorCode::CannotGenerateExisting,
            ModelError::NotInitialized { .. } => ErrorCode::NotInitialized,
            ModelError::ValidatorsFailed { .. } => ErrorCode::ValidatorsFailed,
            ModelError::UnknownField { .. } => ErrorCode::UnknownField,
            ModelError::SetError { .. } => ErrorCode::SetError,
            ModelError::NotNullable { .. } => ErrorCode::NotNullable,
            ModelError::FieldValidatorFailed { .. } => ErrorCode::FieldValidatorFailed,
            ModelError::AssociationInvalid { .. } => ErrorCode::AssociationInvalid,
            ModelError::AssociationValidatorNotFound { .. } => {
                ErrorCode::AssociationValidatorNotFound
            }
            ModelError::DirectInstantiationNotAllowed { .. } => {
                ErrorCode::DirectInstantiationNotAllowed
            }
            ModelError::ModelFieldValidationFailed { .. } => ErrorCode::ModelFieldValidationFailed,
            ModelError::InvalidInput { .. } => ErrorCode::InvalidInput,
            ModelError::InvalidSchema { .. } => ErrorCode::InvalidSchema,
            ModelError::IdFieldCannotBeExcluded { .. } => ErrorCode::IdFieldCannotBeExcluded,
            ModelError::UnauthorizedMethodCall { .. } => ErrorCode::UnauthorizedMethodCall,
            ModelError::Context(_) => ErrorCode::ContextMisconfigured,
        }
    }

    /// Returns the category of this error
    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Returns the field name, if the error concerns one field
    pub fn field(&self) -> Option<&str> {
        match self {
            ModelError::NotReadable { field, .. }
            | ModelError::NotWritable { field, .. }
            | ModelError::FieldIsComputed { field, .. }
            | ModelError::NoGenerator { field, .. }
            | ModelError::NoCompute { field, .. }
            | ModelError::AlreadyGenerated { field, .. }
            | ModelError::CannotGenerateExisting { field, .. }
            | ModelError::NotInitialized { field, .. }
            | ModelError::ValidatorsFailed { field, .. }
            | ModelError::UnknownField { field, .. }
            | ModelError::SetError { field, .. }
            | ModelError::NotNullable { field, .. }
            | ModelError::FieldValidatorFailed { field, .. }
            | ModelError::AssociationInvalid { field, .. }
            | ModelError::AssociationValidatorNotFound { field, .. }
            | ModelError::IdFieldCannotBeExcluded { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns the nested error list for aggregate errors
    pub fn errors(&self) -> Option<&ErrorList> {
        match self {
            ModelError::ValidatorsFailed { errors, .. }
            | ModelError::ModelFieldValidationFailed { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Structured template parameters, excluding nested errors
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        match self {
            ModelError::FieldValidatorFailed {
                model,
                field,
                validator,
                message,
            } => {
                params.push(("model", model.clone()));
                params.push(("field", field.clone()));
                params.push(("validator", validator.clone()));
                params.push(("message", message.clone().unwrap_or_default()));
                params.push((
                    "detail",
                    message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default(),
                ));
            }
            ModelError::AssociationInvalid { model, field, target } => {
                params.push(("model", model.clone()));
                params.push(("field", field.clone()));
                params.push(("target", target.clone()));
            }
            ModelError::SetError { model, field, reason } => {
                params.push(("model", model.clone()));
                params.push(("field", field.clone()));
                params.push(("reason", reason.clone()));
            }
            ModelError::DirectInstantiationNotAllowed { model } => {
                params.push(("model", model.clone()));
            }
            ModelError::ModelFieldValidationFailed { model, errors } => {
                params.push(("model", model.clone()));
                params.push(("count", errors.len().to_string()));
            }
            ModelError::ValidatorsFailed { model, field, errors } => {
                params.push(("model", model.clone()));
                params.push(("field", field.clone()));
                params.push(("count", errors.len().to_string()));
            }
            ModelError::InvalidInput { model, reason }
            | ModelError::InvalidSchema { model, reason } => {
                params.push(("model", model.clone()));
                params.push(("reason", reason.clone()));
            }
            ModelError::UnauthorizedMethodCall { model, method } => {
                params.push(("model", model.clone()));
                params.push(("method", method.clone()));
            }
            ModelError::Context(err) => {
                params.push(("reason", err.to_string()));
            }
            ModelError::NotReadable { model, field }
            | ModelError::NotWritable { model, field }
            | ModelError::FieldIsComputed { model, field }
            | ModelError::NoGenerator { model, field }
            | ModelError::NoCompute { model, field }
            | ModelError::AlreadyGenerated { model, field }
            | ModelError::CannotGenerateExisting { model, field }
            | ModelError::NotInitialized { model, field }
            | ModelError::UnknownField { model, field }
            | ModelError::NotNullable { model, field }
            | ModelError::AssociationValidatorNotFound { model, field }
            | ModelError::IdFieldCannotBeExcluded { model, field } => {
                params.push(("model", model.clone()));
                params.push(("field", field.clone()));
            }
        }
        params
    }

    /// Renders the message through the process-wide message registry
    pub fn message(&self) -> String {
        messages::render(self)
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Context(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContextError> for ModelError {
    fn from(err: ContextError) -> Self {
        ModelError::Context(err)
    }
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Ordered collection of validation errors
#[derive(Debug, Clone, Default)]
pub struct ErrorList {
    errors: Vec<ModelError>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ModelError) {
        self.errors.push(error);
    }

    /// Appends every error of `other`
    pub fn merge(&mut self, other: ErrorList) {
        self.errors.extend(other.errors);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelError> {
        self.errors.iter()
    }

    /// Returns the errors concerning one field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ModelError> + 'a {
        self.errors.iter().filter(move |e| e.field() == Some(field))
    }

    /// Rendered message of every error, in order
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ModelError::message).collect()
    }

    pub fn into_vec(self) -> Vec<ModelError> {
        self.errors
    }
}

impl From<Vec<ModelError>> for ErrorList {
    fn from(errors: Vec<ModelError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ErrorList {
    type Item = ModelError;
    type IntoIter = std::vec::IntoIter<ModelError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a ModelError;
    type IntoIter = std::slice::Iter<'a, ModelError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}
