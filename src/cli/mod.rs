//! CLI module for aeromodel
//!
//! Provides command-line interface for:
//! - make: Construct a new entity from JSON input
//! - hydrate: Rebuild an existing entity from JSON input
//! - validate: Run every validator on an existing entity
//! - schemas: List declared models

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ModelArgs, RuntimeArgs};
pub use commands::{hydrate, make, run, run_command, schemas, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_data, write_response};
