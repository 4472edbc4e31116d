//! Field subsystem
//!
//! - `Field`: shared per (model type, field name), stateless
//! - `BoundField`: per-instance accessor over a `Field`
//! - process-wide generators/validators keyed by field kind

mod bound;
mod equality;
#[allow(clippy::module_inception)]
mod field;
mod globals;

pub use bound::BoundField;
pub use equality::{compare_values, is_empty_value, json_type_name, values_equal};
pub use field::Field;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::context::Context;
    use crate::model::{ErrorCode, Model};
    use crate::schema::{custom, id, integer, string, FieldKind, Generator, ModelSchema, Validator};

    fn profile() -> Arc<ModelSchema> {
        ModelSchema::builder("FieldProfile")
            .field("id", id())
            .field("name", string().validate("min3", |v, _| v.as_str().is_some_and(|s| s.len() >= 3)))
            .field("nickname", string().nullable())
            .field("secret", string().readable(false))
            .field("locked", string().writable(false))
            .field(
                "note",
                string().writable_when(|ctx, _, _| -> Result<bool, String> {
                    if ctx.has_role("editor") {
                        Ok(true)
                    } else {
                        Err("not an editor".into())
                    }
                }),
            )
            .field("age", integer().validate_lazy("adult", |v, _| {
                if v.as_i64().is_some_and(|n| n >= 18) { Ok(()) } else { Err("must be an adult".to_string()) }
            }))
            .field("token", string().generate_lazy(|| "tok"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_get_uninitialized_fails_unsafe_get_does_not() {
        let mut model = profile().make(json!({"id": "p1", "name": "Ada"})).unwrap();
        let field = model.field("nickname").unwrap();
        assert_eq!(field.get().unwrap_err().code(), ErrorCode::NotInitialized);
        assert!(field.unsafe_get().is_none());
    }

    #[test]
    fn test_get_not_readable() {
        let mut model = profile()
            .make(json!({"id": "p1", "name": "Ada", "secret": "s3"}))
            .unwrap();
        let field = model.field("secret").unwrap();
        assert_eq!(field.get().unwrap_err().code(), ErrorCode::NotReadable);
        assert_eq!(field.unsafe_get(), Some(&json!("s3")));
    }

    #[test]
    fn test_get_reruns_validators() {
        let mut model = profile().make(json!({"id": "p1", "name": "Ada"})).unwrap();
        let mut field = model.field("name").unwrap();
        field.set("Al").unwrap();
        let err = field.get().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidatorsFailed);
        assert_eq!(err.errors().unwrap().len(), 1);
    }

    #[test]
    fn test_set_rules() {
        let mut model = profile().make(json!({"id": "p1", "name": "Ada"})).unwrap();

        let err = model.field("locked").unwrap().set("x").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotWritable);

        let err = model.field("name").unwrap().set(json!(null)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotNullable);

        model.field("nickname").unwrap().set(json!(null)).unwrap();
        assert_eq!(model.unsafe_get("nickname"), Some(&json!(null)));
    }

    #[test]
    fn test_predicate_error_is_fail_closed() {
        let mut model = profile().make(json!({"id": "p1", "name": "Ada"})).unwrap();
        assert!(!model.field("note").unwrap().is_writable());

        let mut model = model.with_context(Context::actor("e").with_role("editor"));
        let mut note = model.field("note").unwrap();
        assert!(note.is_writable());
        note.set("hello").unwrap();
    }

    #[test]
    fn test_lazy_validator_only_on_explicit_validate() {
        let mut model = profile()
            .make(json!({"id": "p1", "name": "Ada", "age": 12}))
            .unwrap();
        let field = model.field("age").unwrap();
        let errors = field.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors.messages()[0].contains("must be an adult"));
        assert!(!field.is_valid());
    }

    #[test]
    fn test_type_validator() {
        let err = profile()
            .make(json!({"id": "p1", "name": 42}))
            .unwrap_err();
        let errors = err.errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors.iter().next().unwrap(),
            crate::model::ModelError::FieldValidatorFailed { validator, .. } if validator == "type"
        ));
    }

    #[test]
    fn test_is_and_emptiness() {
        let mut model = profile()
            .make(json!({"id": "p1", "name": "Ada", "nickname": "  "}))
            .unwrap();
        let field = model.field("name").unwrap();
        assert!(field.is(&json!("Ada")));
        assert!(!field.is(&json!("ada")));
        assert!(field.is_present());

        let nickname = model.field("nickname").unwrap();
        assert!(nickname.is_empty());
        assert!(!nickname.is_present());
    }

    #[test]
    fn test_generate_rules() {
        let schema = profile();
        let mut model = schema.make(json!({"id": "p1", "name": "Ada"})).unwrap();
        assert!(model.unsafe_get("token").is_none());

        model.field("token").unwrap().generate().unwrap();
        assert_eq!(model.unsafe_get("token"), Some(&json!("tok")));

        let err = model.field("token").unwrap().generate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyGenerated);

        let err = model.field("name").unwrap().generate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoGenerator);

        let mut existing = schema.from(json!({"id": "p1", "name": "Ada"})).unwrap();
        let err = existing.field("token").unwrap().generate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::CannotGenerateExisting);
    }

    #[test]
    fn test_compute_requires_compute_function() {
        let mut model = profile().make(json!({"id": "p1", "name": "Ada"})).unwrap();
        let err = model.field("name").unwrap().compute().unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoCompute);
    }

    #[test]
    fn test_global_generator_and_validator() {
        let kind = FieldKind::Custom("field_test_slug".into());
        Field::set_global_generator(kind.clone(), Generator::eager(|| "generated-slug"));
        Field::add_global_validator(
            kind.clone(),
            Validator::eager("lowercase", |v: &serde_json::Value, _: &Model| {
                v.as_str().is_some_and(|s| s == s.to_lowercase())
            }),
        );

        let schema = ModelSchema::builder("FieldSlugged")
            .field("id", id())
            .field("slug", custom("field_test_slug"))
            .build()
            .unwrap();

        let model = schema.make(json!({"id": 1})).unwrap();
        assert_eq!(model.unsafe_get("slug"), Some(&json!("generated-slug")));

        let err = schema.make(json!({"id": 1, "slug": "Upper"})).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ModelFieldValidationFailed);
        assert_eq!(err.errors().unwrap().len(), 1);
    }

    #[test]
    fn test_bound_field_exposes_metadata() {
        let mut model = profile().make(json!({"id": "p1", "name": "Ada"})).unwrap();
        let field = model.field("nickname").unwrap();
        assert_eq!(field.name(), "nickname");
        assert_eq!(field.meta().model, "FieldProfile");
        assert!(field.options().nullable);
        assert!(field.is_readable());
    }

    struct Unserializable;

    impl serde::Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    #[test]
    fn test_set_typed() {
        let schema = profile();
        let mut model = schema.make(json!({"id": "p1", "name": "Ada"})).unwrap();
        let field = Arc::clone(schema.field("nickname").unwrap());

        field.set_typed(&mut model, &Some("Lace")).unwrap();
        assert_eq!(model.unsafe_get("nickname"), Some(&json!("Lace")));

        let err = field.set_typed(&mut model, &Unserializable).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SetError);
        assert!(err.message().contains("cannot encode"));
        assert_eq!(model.unsafe_get("nickname"), Some(&json!("Lace")));
    }
}
