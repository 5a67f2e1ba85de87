//! Validate command implementation.
//!
//! The `clispec validate` command runs the full resolution pipeline and
//! reports either success or the failing stage's diagnostics.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::cli::args::ValidateArgs;
use crate::error::{ClispecError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{run_pipeline, Command, CommandResult};

/// The validate command implementation.
pub struct ValidateCommand {
    config: Option<PathBuf>,
}

impl ValidateCommand {
    /// Create a new validate command.
    pub fn new(config: Option<PathBuf>, _args: ValidateArgs) -> Self {
        Self { config }
    }
}

impl Command for ValidateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match run_pipeline(self.config.as_deref(), &HashMap::new()) {
            Ok((path, _resolution)) => {
                ui.success(&format!(
                    "OK: {} resolves against the core schema",
                    path.display()
                ));
                Ok(CommandResult::success())
            }
            Err(ClispecError::ConfigNotFound { path }) => {
                ui.error(&format!(
                    "No spec document found at {}. Use --config or set CLISPEC_APP_CONFIG.",
                    path.display()
                ));
                Ok(CommandResult::failure(2))
            }
            Err(ClispecError::ConfigParseError { path, message }) => {
                ui.error(&format!("Parse error in {}: {}", path.display(), message));
                Ok(CommandResult::failure(1))
            }
            Err(ClispecError::InvalidDocument { message }) => {
                ui.error(&format!("Invalid document: {message}"));
                Ok(CommandResult::failure(1))
            }
            Err(ClispecError::Resolve(err)) => {
                for line in err.report().lines() {
                    ui.error(line);
                }
                Ok(CommandResult::failure(1))
            }
            Err(e) => Err(e),
        }
    }
}
