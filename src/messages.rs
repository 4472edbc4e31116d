//! Error message registry
//!
//! Maps error codes to message templates. Templates use `{param}`
//! placeholders filled from `ModelError::params()`; aggregate errors also
//! expose `{errors}` (nested messages joined by "; ") and `{count}`.
//!
//! Rendered messages are prefixed with `[CODE] ` unless codes are hidden.
//! Hiding codes affects rendered text only, never `ModelError::code()`.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use crate::model::{ErrorCode, ModelError};

/// Message templates and rendering options
#[derive(Debug, Clone, Default)]
pub struct MessageRegistry {
    templates: HashMap<ErrorCode, String>,
    hide_codes: bool,
}

impl MessageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the template for `code`
    pub fn set_template(&mut self, code: ErrorCode, template: impl Into<String>) {
        self.templates.insert(code, template.into());
    }

    /// Drops an override, restoring the built-in template
    pub fn clear_template(&mut self, code: ErrorCode) {
        self.templates.remove(&code);
    }

    pub fn set_hide_codes(&mut self, hide: bool) {
        self.hide_codes = hide;
    }

    pub fn hides_codes(&self) -> bool {
        self.hide_codes
    }

    /// Returns the active template for `code`
    pub fn template(&self, code: ErrorCode) -> &str {
        self.templates
            .get(&code)
            .map(String::as_str)
            .unwrap_or_else(|| default_template(code))
    }

    /// Renders `err` with this registry
    pub fn render(&self, err: &ModelError) -> String {
        let mut params = err.params();
        if let Some(errors) = err.errors() {
            let nested: Vec<String> = errors.iter().map(|e| self.render(e)).collect();
            params.push(("errors", nested.join("; ")));
        }
        let text = fill(self.template(err.code()), &params);

        if self.hide_codes {
            text
        } else {
            format!("[{}] {}", err.code().code(), text)
        }
    }
}

/// Substitutes `{name}` placeholders in one pass. Substituted values are
/// never rescanned; unknown placeholders are kept verbatim.
fn fill(template: &str, params: &[(&'static str, String)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            output.push_str(tail);
            return output;
        };
        let name = &tail[1..close];
        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => output.push_str(value),
            None => output.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }
    output.push_str(rest);
    output
}

/// Built-in template for `code`
pub fn default_template(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::NotReadable => "Field '{field}' of model '{model}' is not readable",
        ErrorCode::NotWritable => "Field '{field}' of model '{model}' is not writable",
        ErrorCode::FieldIsComputed => {
            "Field '{field}' of model '{model}' is computed and cannot be assigned"
        }
        ErrorCode::NoGenerator => "Field '{field}' of model '{model}' has no generator",
        ErrorCode::NoCompute => "Field '{field}' of model '{model}' has no compute function",
        ErrorCode::AlreadyGenerated => {
            "Field '{field}' of model '{model}' already has a value and cannot be generated"
        }
        ErrorCode::CannotGenerateExisting => {
            "Field '{field}' of existing model '{model}' cannot be generated"
        }
        ErrorCode::NotInitialized => "Field '{field}' of model '{model}' is not initialized",
        ErrorCode::ValidatorsFailed => {
            "Field '{field}' of model '{model}' failed {count} validator(s): {errors}"
        }
        ErrorCode::UnknownField => "Model '{model}' has no field '{field}'",
        ErrorCode::SetError => "Could not set field '{field}' of model '{model}': {reason}",
        ErrorCode::NotNullable => "Field '{field}' of model '{model}' is not nullable",
        ErrorCode::FieldValidatorFailed => {
            "Field '{field}' of model '{model}' failed validator '{validator}'{detail}"
        }
        ErrorCode::AssociationInvalid => {
            "Field '{field}' of model '{model}' is not consistent with associated model '{target}'"
        }
        ErrorCode::AssociationValidatorNotFound => {
            "No association validator registered for field '{field}' of model '{model}'"
        }
        ErrorCode::DirectInstantiationNotAllowed => {
            "Model '{model}' must be constructed through make or from"
        }
        ErrorCode::ModelFieldValidationFailed => {
            "Model '{model}' failed validation with {count} error(s): {errors}"
        }
        ErrorCode::InvalidInput => "Invalid input for model '{model}': {reason}",
        ErrorCode::InvalidSchema => "Invalid schema for model '{model}': {reason}",
        ErrorCode::IdFieldCannotBeExcluded => {
            "ID field '{field}' of model '{model}' cannot be excluded"
        }
        ErrorCode::UnauthorizedMethodCall => {
            "Unauthorized call to method '{method}' of model '{model}'"
        }
        ErrorCode::ContextMisconfigured => "{reason}",
    }
}

static REGISTRY: LazyLock<RwLock<MessageRegistry>> =
    LazyLock::new(|| RwLock::new(MessageRegistry::new()));

/// Overrides the process-wide template for `code`
pub fn set_template(code: ErrorCode, template: impl Into<String>) {
    let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    registry.set_template(code, template);
}

/// Hides or shows error codes in rendered messages process-wide
pub fn hide_codes(hide: bool) {
    let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    registry.set_hide_codes(hide);
}

/// Restores built-in templates and visible codes
pub fn reset() {
    let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    *registry = MessageRegistry::new();
}

/// Renders `err` through the process-wide registry
pub fn render(err: &ModelError) -> String {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    registry.render(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorList;

    fn not_writable() -> ModelError {
        ModelError::NotWritable {
            model: "User".into(),
            field: "role".into(),
        }
    }

    #[test]
    fn test_default_render_includes_code() {
        let registry = MessageRegistry::new();
        let text = registry.render(&not_writable());
        assert_eq!(
            text,
            "[AERO_MODEL_NOT_WRITABLE] Field 'role' of model 'User' is not writable"
        );
    }

    #[test]
    fn test_hidden_codes() {
        let mut registry = MessageRegistry::new();
        registry.set_hide_codes(true);
        let err = not_writable();
        assert!(!registry.render(&err).contains("AERO_"));
        assert_eq!(err.code(), ErrorCode::NotWritable);
    }

    #[test]
    fn test_template_override() {
        let mut registry = MessageRegistry::new();
        registry.set_template(ErrorCode::NotWritable, "{model}.{field} is read-only");
        assert_eq!(
            registry.render(&not_writable()),
            "[AERO_MODEL_NOT_WRITABLE] User.role is read-only"
        );
        registry.clear_template(ErrorCode::NotWritable);
        assert!(registry.render(&not_writable()).contains("is not writable"));
    }

    #[test]
    fn test_param_values_are_not_rescanned() {
        let registry = MessageRegistry::new();
        let err = ModelError::FieldValidatorFailed {
            model: "User".into(),
            field: "bio".into(),
            validator: "{model}".into(),
            message: Some("{field} bad".into()),
        };
        let text = registry.render(&err);
        assert!(text.contains("validator '{model}'"));
        assert!(text.contains("{field} bad"));
        assert!(text.contains("Field 'bio' of model 'User'"));
    }

    #[test]
    fn test_fill_keeps_unknown_placeholders() {
        let params = [("model", "User".to_string())];
        assert_eq!(fill("{model} {nope} {", &params), "User {nope} {");
    }

    #[test]
    fn test_aggregate_renders_nested_messages() {
        let mut registry = MessageRegistry::new();
        registry.set_hide_codes(true);
        let errors = ErrorList::from(vec![
            ModelError::NotNullable {
                model: "User".into(),
                field: "name".into(),
            },
            ModelError::FieldValidatorFailed {
                model: "User".into(),
                field: "email".into(),
                validator: "email".into(),
                message: None,
            },
        ]);
        let err = ModelError::ModelFieldValidationFailed {
            model: "User".into(),
            errors,
        };
        let text = registry.render(&err);
        assert!(text.starts_with("Model 'User' failed validation with 2 error(s)"));
        assert!(text.contains("Field 'name' of model 'User' is not nullable"));
        assert!(text.contains("failed validator 'email'"));
    }
}
