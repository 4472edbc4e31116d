//! Model schema: the declared fields and permissions of one model type

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::association::{self, Association};
use crate::auth::PermissionTable;
use crate::context::Context;
use crate::field::Field;
use crate::model::{Model, ModelError, ModelResult};
use crate::observability::{log_event_with_fields, Event};

use super::builder::FieldBuilder;
use super::types::IntoRuleResult;

/// Complete, immutable declaration of a model type
pub struct ModelSchema {
    name: String,
    id_field: String,
    fields: Vec<Arc<Field>>,
    index: HashMap<String, usize>,
    permissions: PermissionTable,
}

impl ModelSchema {
    /// Starts declaring a model type
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Arc<Field>> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name())
    }

    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    /// Association entries derived from the fields' `associate` rules
    pub fn associations(&self) -> Vec<Association> {
        self.fields
            .iter()
            .filter_map(|field| {
                let rule = field.options().associate.as_ref()?;
                let target = field.meta().kind.target()?;
                Some(Association {
                    source_model: self.name.clone(),
                    source_path: rule.to.clone(),
                    field_name: field.name().to_string(),
                    target_model: target.to_string(),
                    target_path: rule.from.clone(),
                })
            })
            .collect()
    }

    /// Constructs a new entity
    pub fn make(self: &Arc<Self>, data: serde_json::Value) -> ModelResult<Model> {
        Model::make(self, data)
    }

    /// Hydrates an existing entity
    pub fn from(self: &Arc<Self>, data: serde_json::Value) -> ModelResult<Model> {
        Model::from(self, data)
    }
}

impl fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSchema")
            .field("name", &self.name)
            .field("id_field", &self.id_field)
            .field("fields", &self.fields)
            .field("permissions", &self.permissions)
            .finish()
    }
}

/// Accumulates a model declaration
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    id_field: String,
    fields: Vec<(String, FieldBuilder)>,
    permissions: PermissionTable,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_field: "id".to_string(),
            fields: Vec::new(),
            permissions: PermissionTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(mut self, name: impl Into<String>, builder: FieldBuilder) -> Self {
        self.fields.push((name.into(), builder));
        self
    }

    /// Names the ID field (default `id`)
    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.id_field = name.into();
        self
    }

    /// Guards `method` with a permission predicate
    pub fn authorize<F, R>(mut self, method: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&Context, &Model) -> R + Send + Sync + 'static,
        R: IntoRuleResult,
    {
        self.permissions.insert(method, rule);
        self
    }

    /// Builds the schema without touching process-wide registries
    pub fn build(self) -> ModelResult<Arc<ModelSchema>> {
        let invalid = |reason: String| ModelError::InvalidSchema {
            model: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("model name must not be empty".into()));
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        let mut index = HashMap::with_capacity(self.fields.len());
        for (name, builder) in &self.fields {
            if index.contains_key(name) {
                return Err(invalid(format!("field '{}' declared twice", name)));
            }
            if builder.options().associate.is_some() && builder.kind().target().is_none() {
                return Err(invalid(format!(
                    "field '{}' declares an association but is not a related model",
                    name
                )));
            }
            index.insert(name.clone(), fields.len());
            fields.push(Arc::new(builder.to_field(&self.name, name)));
        }

        if !index.contains_key(&self.id_field) {
            return Err(invalid(format!("ID field '{}' is not declared", self.id_field)));
        }

        Ok(Arc::new(ModelSchema {
            name: self.name,
            id_field: self.id_field,
            fields,
            index,
            permissions: self.permissions,
        }))
    }

    /// Builds the schema and registers its associations process-wide
    pub fn register(self) -> ModelResult<Arc<ModelSchema>> {
        let schema = self.build()?;
        for entry in schema.associations() {
            association::register(entry);
        }
        log_event_with_fields(Event::SchemaRegistered, &[("model", schema.name())]);
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorCode;
    use crate::schema::{id, related, string};

    #[test]
    fn test_build_indexes_fields_in_order() {
        let schema = ModelSchema::builder("Account")
            .field("id", id())
            .field("name", string())
            .build()
            .unwrap();

        assert_eq!(schema.name(), "Account");
        assert_eq!(schema.id_field(), "id");
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["id", "name"]);
        assert!(schema.has_field("name"));
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_missing_id_field_rejected() {
        let err = ModelSchema::builder("Account")
            .field("name", string())
            .build()
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSchema);
    }

    #[test]
    fn test_custom_id_field() {
        let schema = ModelSchema::builder("Account")
            .id_field("uid")
            .field("uid", id())
            .build()
            .unwrap();
        assert_eq!(schema.id_field(), "uid");
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = ModelSchema::builder("Account")
            .field("id", id())
            .field("id", string())
            .build()
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSchema);
    }

    #[test]
    fn test_association_requires_related_kind() {
        let err = ModelSchema::builder("Account")
            .field("id", id())
            .field("owner", string().associate("id", "owner_id"))
            .build()
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidSchema);
    }

    #[test]
    fn test_associations_derived_from_fields() {
        let schema = ModelSchema::builder("SchemaTestPost")
            .field("id", id())
            .field("author", related("SchemaTestUser").associate("id", "author_id"))
            .build()
            .unwrap();

        let entries = schema.associations();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_model, "SchemaTestPost");
        assert_eq!(entries[0].source_path, "author_id");
        assert_eq!(entries[0].field_name, "author");
        assert_eq!(entries[0].target_model, "SchemaTestUser");
        assert_eq!(entries[0].target_path, "id");
    }
}
