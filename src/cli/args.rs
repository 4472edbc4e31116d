//! CLI argument definitions using clap
//!
//! Commands:
//! - aeromodel make --model <name> [--data <file>]
//! - aeromodel hydrate --model <name> [--data <file>]
//! - aeromodel validate --model <name> [--data <file>]
//! - aeromodel schemas
//!
//! Every command accepts `--config <path>` and `--schema-dir <dir>`.
//! Without `--data`, input is read from stdin.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// aeromodel - A strict, schema-driven domain model runtime
#[derive(Parser, Debug)]
#[command(name = "aeromodel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Construct a new entity, applying defaults and generators
    Make(ModelArgs),

    /// Hydrate an existing entity as-is
    Hydrate(ModelArgs),

    /// Hydrate an entity and run every validator, eager and lazy
    Validate(ModelArgs),

    /// List the models declared in the schema directory
    Schemas(RuntimeArgs),
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct RuntimeArgs {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Schema directory, overriding the configured one
    #[arg(long)]
    pub schema_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    /// Model name
    #[arg(long)]
    pub model: String,

    /// JSON input file (stdin if omitted)
    #[arg(long)]
    pub data: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
