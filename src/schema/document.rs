//! JSON schema file format
//!
//! ```json
//! {
//!   "model": "Post",
//!   "id_field": "id",
//!   "fields": {
//!     "id":     { "kind": "id", "generate": "uuid" },
//!     "title":  { "kind": "string", "validators": [{ "rule": "min_length", "value": 3 }] },
//!     "author": { "kind": "model", "target": "User", "associate": { "from": "id", "to": "author_id" } }
//!   }
//! }
//! ```
//!
//! Fields are declared in key order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::builder::FieldBuilder;
use super::catalog;
use super::model_schema::{ModelSchema, SchemaBuilder};
use super::types::{FieldKind, Mode};

/// One model declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
    pub fields: BTreeMap<String, FieldDocument>,
}

/// One field declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDocument {
    pub kind: String,
    /// Target model for `model` kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Built-in generator name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate: Option<String>,
    #[serde(default)]
    pub lazy_generate: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<RuleDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associate: Option<AssociateDocument>,
}

/// Built-in validator reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default)]
    pub lazy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssociateDocument {
    pub from: String,
    pub to: String,
}

fn mode(lazy: bool) -> Mode {
    if lazy {
        Mode::Lazy
    } else {
        Mode::Eager
    }
}

impl FieldDocument {
    pub fn to_kind(&self) -> Result<FieldKind, String> {
        let kind = match self.kind.as_str() {
            "any" => FieldKind::Any,
            "id" => FieldKind::Id,
            "string" => FieldKind::String,
            "number" => FieldKind::Number,
            "integer" => FieldKind::Integer,
            "boolean" => FieldKind::Boolean,
            "date" => FieldKind::Date,
            "array" => FieldKind::Array,
            "object" => FieldKind::Object,
            "model" => match &self.target {
                Some(target) => FieldKind::Model(target.clone()),
                None => return Err("kind 'model' requires a target".to_string()),
            },
            "" => return Err("kind must not be empty".to_string()),
            custom => FieldKind::Custom(custom.to_string()),
        };
        if self.target.is_some() && kind.target().is_none() {
            return Err(format!("kind '{}' does not take a target", self.kind));
        }
        Ok(kind)
    }

    pub fn to_builder(&self) -> Result<FieldBuilder, String> {
        let mut builder = FieldBuilder::new(self.to_kind()?);

        if self.nullable {
            builder = builder.nullable();
        }
        if let Some(readable) = self.readable {
            builder = builder.readable(readable);
        }
        if let Some(writable) = self.writable {
            builder = builder.writable(writable);
        }
        if let Some(default) = &self.default {
            builder = builder.default(default.clone());
        }
        if let Some(name) = &self.generate {
            let generator = catalog::generator(name, mode(self.lazy_generate))
                .ok_or_else(|| format!("unknown generator '{}'", name))?;
            builder = builder.generator(generator);
        }
        for rule in &self.validators {
            builder = builder.validator(catalog::validator(
                &rule.rule,
                rule.value.as_ref(),
                mode(rule.lazy),
            )?);
        }
        if let Some(associate) = &self.associate {
            builder = builder.associate(associate.from.clone(), associate.to.clone());
        }
        Ok(builder)
    }
}

impl SchemaDocument {
    /// Converts to a schema builder, naming the offending field on failure
    pub fn to_builder(&self) -> Result<SchemaBuilder, String> {
        let mut builder = ModelSchema::builder(self.model.clone());
        if let Some(id_field) = &self.id_field {
            builder = builder.id_field(id_field.clone());
        }
        for (name, field) in &self.fields {
            let field_builder = field
                .to_builder()
                .map_err(|reason| format!("field '{}': {}", name, reason))?;
            builder = builder.field(name.clone(), field_builder);
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> SchemaDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_and_build() {
        let doc = document(json!({
            "model": "DocPost",
            "fields": {
                "id": {"kind": "id", "generate": "uuid"},
                "title": {"kind": "string", "validators": [{"rule": "min_length", "value": 3}]},
                "author": {"kind": "model", "target": "DocUser", "associate": {"from": "id", "to": "author_id"}},
                "author_id": {"kind": "integer"}
            }
        }));
        let schema = doc.to_builder().unwrap().build().unwrap();

        assert_eq!(schema.name(), "DocPost");
        let title = schema.field("title").unwrap();
        assert_eq!(title.options().validators.len(), 1);
        assert!(schema.field("id").unwrap().options().generator.is_some());
        assert_eq!(schema.associations().len(), 1);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let parsed: Result<SchemaDocument, _> = serde_json::from_value(json!({
            "model": "X",
            "fields": {"id": {"kind": "id", "colour": "red"}}
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_kind_errors() {
        let missing_target = FieldDocument {
            kind: "model".into(),
            ..Default::default()
        };
        assert!(missing_target.to_kind().is_err());

        let stray_target = FieldDocument {
            kind: "string".into(),
            target: Some("User".into()),
            ..Default::default()
        };
        assert!(stray_target.to_kind().is_err());

        let custom = FieldDocument {
            kind: "money".into(),
            ..Default::default()
        };
        assert_eq!(custom.to_kind().unwrap(), FieldKind::Custom("money".into()));
    }

    #[test]
    fn test_bad_rule_names_field() {
        let doc = document(json!({
            "model": "DocBad",
            "fields": {"id": {"kind": "id", "validators": [{"rule": "nope"}]}}
        }));
        let err = doc.to_builder().unwrap_err();
        assert!(err.starts_with("field 'id'"));
    }
}
