//! CLI command implementations
//!
//! Every command follows the same boot sequence:
//! 1. Configuration load (file if given, defaults otherwise)
//! 2. Configuration apply (log level, message codes, context mode)
//! 3. Schema load from the schema directory
//!
//! Commands return their response document; `run_command` writes it.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::RuntimeConfig;
use crate::model::Model;
use crate::schema::{ModelSchema, SchemaLoader};

use super::args::{Command, ModelArgs, RuntimeArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_data, write_response};

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let response = match cmd {
        Command::Make(args) => make(&args)?,
        Command::Hydrate(args) => hydrate(&args)?,
        Command::Validate(args) => validate(&args)?,
        Command::Schemas(args) => schemas(&args)?,
    };
    write_response(response)
}

fn boot(args: &RuntimeArgs) -> CliResult<SchemaLoader> {
    let mut config = match &args.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    if let Some(dir) = &args.schema_dir {
        config.schema_dir = dir.clone();
    }
    config.apply()?;

    let mut loader = SchemaLoader::new(&config.schema_dir);
    loader.load_all()?;
    Ok(loader)
}

fn resolve(args: &ModelArgs) -> CliResult<(Arc<ModelSchema>, Value)> {
    let loader = boot(&args.runtime)?;
    let schema = loader
        .get(&args.model)
        .ok_or_else(|| CliError::unknown_model(&args.model))?;
    let data = read_data(args.data.as_deref())?;
    Ok((schema, data))
}

fn describe(model: &Model) -> CliResult<Value> {
    Ok(json!({
        "model": model.name(),
        "initializer": model.initializer().as_str(),
        "data": model.to_json(),
        "changes": serde_json::to_value(model.get_changes())?,
    }))
}

/// Construct a new entity
pub fn make(args: &ModelArgs) -> CliResult<Value> {
    let (schema, data) = resolve(args)?;
    let model = schema.make(data)?;
    describe(&model)
}

/// Hydrate an existing entity
pub fn hydrate(args: &ModelArgs) -> CliResult<Value> {
    let (schema, data) = resolve(args)?;
    let model = schema.from(data)?;
    describe(&model)
}

/// Hydrate, then run eager and lazy validators on every field
pub fn validate(args: &ModelArgs) -> CliResult<Value> {
    let (schema, data) = resolve(args)?;
    let model = schema.from(data)?;
    let errors = model.validate(None)?;
    if !errors.is_empty() {
        let lines: Vec<String> = errors.messages();
        return Err(CliError::model_rejected(format!(
            "{} validation error(s):\n  - {}",
            lines.len(),
            lines.join("\n  - ")
        )));
    }
    Ok(json!({ "model": model.name(), "valid": true }))
}

/// List declared models
pub fn schemas(args: &RuntimeArgs) -> CliResult<Value> {
    let loader = boot(args)?;
    let models: Vec<Value> = loader
        .model_names()
        .into_iter()
        .filter_map(|name| loader.get(name))
        .map(|schema| {
            json!({
                "model": schema.name(),
                "id_field": schema.id_field(),
                "fields": schema.field_names().collect::<Vec<_>>(),
                "guarded_methods": schema.permissions().methods(),
            })
        })
        .collect();
    Ok(json!({ "schemas": models }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn setup(temp_dir: &TempDir) {
        let schemas = temp_dir.path().join("schemas");
        fs::create_dir_all(&schemas).unwrap();
        fs::write(
            schemas.join("ticket.json"),
            json!({
                "model": "CliTicket",
                "fields": {
                    "id": {"kind": "id", "generate": "uuid"},
                    "title": {"kind": "string", "validators": [{"rule": "min_length", "value": 3}]},
                    "status": {"kind": "string", "default": "open"},
                    "summary": {"kind": "string", "validators": [{"rule": "max_length", "value": 5, "lazy": true}]}
                }
            })
            .to_string(),
        )
        .unwrap();
    }

    fn args(temp_dir: &TempDir, model: &str, data: Value) -> ModelArgs {
        let data_path = temp_dir.path().join("input.json");
        fs::write(&data_path, data.to_string()).unwrap();
        ModelArgs {
            runtime: RuntimeArgs {
                config: None,
                schema_dir: Some(temp_dir.path().join("schemas")),
            },
            model: model.to_string(),
            data: Some(data_path),
        }
    }

    #[test]
    fn test_make_applies_defaults_and_generators() {
        let temp_dir = TempDir::new().unwrap();
        setup(&temp_dir);

        let out = make(&args(&temp_dir, "CliTicket", json!({"title": "Broken"}))).unwrap();
        assert_eq!(out["initializer"], "make");
        assert_eq!(out["data"]["status"], "open");
        assert!(out["data"]["id"].is_string());
        assert!(out["changes"]["title"].is_object());
    }

    #[test]
    fn test_hydrate_has_no_changes() {
        let temp_dir = TempDir::new().unwrap();
        setup(&temp_dir);

        let out = hydrate(&args(&temp_dir, "CliTicket", json!({"id": "t1", "title": "Broken"}))).unwrap();
        assert_eq!(out["initializer"], "from");
        assert_eq!(out["changes"], json!({}));
        assert!(out["data"].get("status").is_none());
    }

    #[test]
    fn test_make_rejects_invalid_input() {
        let temp_dir = TempDir::new().unwrap();
        setup(&temp_dir);

        let err = make(&args(&temp_dir, "CliTicket", json!({"title": "x"}))).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ModelRejected);
        assert!(err.message().contains("title"));
    }

    #[test]
    fn test_validate_runs_lazy_validators() {
        let temp_dir = TempDir::new().unwrap();
        setup(&temp_dir);

        let ok = validate(&args(&temp_dir, "CliTicket", json!({"id": "t1", "summary": "ok"}))).unwrap();
        assert_eq!(ok["valid"], true);

        let err = validate(&args(
            &temp_dir,
            "CliTicket",
            json!({"id": "t1", "summary": "far too long"}),
        ))
        .unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ModelRejected);
    }

    #[test]
    fn test_unknown_model() {
        let temp_dir = TempDir::new().unwrap();
        setup(&temp_dir);

        let err = make(&args(&temp_dir, "Nope", json!({}))).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::UnknownModel);
    }

    #[test]
    fn test_schemas_lists_models() {
        let temp_dir = TempDir::new().unwrap();
        setup(&temp_dir);

        let out = schemas(&RuntimeArgs {
            config: None,
            schema_dir: Some(temp_dir.path().join("schemas")),
        })
        .unwrap();
        assert_eq!(out["schemas"][0]["model"], "CliTicket");
        assert_eq!(out["schemas"][0]["id_field"], "id");
    }

    #[test]
    fn test_bad_config_path() {
        let err = schemas(&RuntimeArgs {
            config: Some(Path::new("/nonexistent/aeromodel.json").to_path_buf()),
            schema_dir: None,
        })
        .unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }
}
