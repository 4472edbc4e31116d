//! Schema loader for model declarations stored on disk
//!
//! - One `*.json` file per model, in a flat directory
//! - Files load in path order; a model name may be declared once
//! - Loading registers each model's associations process-wide

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::observability::{log_event_with_fields, Event};

use super::document::SchemaDocument;
use super::errors::{SchemaError, SchemaResult};
use super::model_schema::{ModelSchema, SchemaBuilder};

/// Reads schema files and keeps the registered models by name
pub struct SchemaLoader {
    schema_dir: PathBuf,
    schemas: HashMap<String, Arc<ModelSchema>>,
}

impl SchemaLoader {
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every schema file in the directory, returning how many were
    /// loaded. A missing directory holds no schemas.
    pub fn load_all(&mut self) -> SchemaResult<usize> {
        if !self.schema_dir.exists() {
            return Ok(0);
        }

        let dir = self.schema_dir.display().to_string();
        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed(&dir, format!("Failed to read schema directory: {}", e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(&dir, format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            self.load_file(path)?;
        }

        let count = paths.len().to_string();
        log_event_with_fields(Event::SchemasLoaded, &[("count", &count), ("dir", &dir)]);
        Ok(paths.len())
    }

    /// Loads and registers a single schema file
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<Arc<ModelSchema>> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::malformed(&display, format!("Failed to read file: {}", e)))?;

        let document: SchemaDocument = serde_json::from_str(&content)
            .map_err(|e| SchemaError::malformed(&display, format!("Invalid JSON: {}", e)))?;

        let builder = document
            .to_builder()
            .map_err(|reason| SchemaError::invalid(&document.model, reason).at(&display))?;

        self.register(builder).map_err(|e| e.at(&display))
    }

    /// Registers a declaration built in code
    pub fn register(&mut self, builder: SchemaBuilder) -> SchemaResult<Arc<ModelSchema>> {
        let name = builder.name().to_string();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::immutable(name));
        }

        let schema = builder
            .register()
            .map_err(|e| SchemaError::invalid(&name, e.message()))?;
        self.schemas.insert(name, Arc::clone(&schema));
        Ok(schema)
    }

    pub fn get(&self, model: &str) -> Option<Arc<ModelSchema>> {
        self.schemas.get(model).cloned()
    }

    /// Like `get`, failing for unknown models
    pub fn require(&self, model: &str) -> SchemaResult<Arc<ModelSchema>> {
        self.get(model).ok_or_else(|| SchemaError::unknown(model))
    }

    pub fn exists(&self, model: &str) -> bool {
        self.schemas.contains_key(model)
    }

    /// Registered model names, sorted
    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}
