//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::cli::args::{Cli, Commands};
use crate::config::{discover_config_path, load_document};
use crate::error::Result;
use crate::resolver::{self, ProcessEnvironment, Resolution};
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
#[derive(Debug, Default)]
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Create a new dispatcher.
    pub fn new() -> Self {
        Self
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = cli.config.clone();
        match &cli.command {
            Commands::Validate(args) => {
                let cmd = super::validate::ValidateCommand::new(config, args.clone());
                cmd.execute(ui)
            }
            Commands::Explain(args) => {
                let cmd = super::explain::ExplainCommand::new(config, args.clone());
                cmd.execute(ui)
            }
            Commands::Generate(args) => {
                let cmd = super::generate::GenerateCommand::new(config, args.clone());
                cmd.execute(ui)
            }
            Commands::Styles(args) => {
                let cmd = super::styles::StylesCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}

/// Load the spec document and run the full pipeline with the process
/// environment, returning the discovered path alongside the resolution.
pub(crate) fn run_pipeline(
    config: Option<&Path>,
    cli_values: &HashMap<String, Value>,
) -> Result<(PathBuf, Resolution)> {
    let path = discover_config_path(config)?;
    let raw = load_document(&path)?;
    let mut env = ProcessEnvironment;
    let resolution = resolver::resolve(&raw, cli_values, &mut env)?;
    Ok((path, resolution))
}
