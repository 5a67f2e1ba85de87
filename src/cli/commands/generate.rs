//! Generate command implementation.
//!
//! The `clispec generate` command validates the spec document, writes a
//! minimal runnable CLI crate scaffold, and prints integration
//! instructions for the host project's packaging style.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::cli::args::GenerateArgs;
use crate::error::{ClispecError, Result};
use crate::scaffold::{detect_packaging, generate_instructions, generate_scaffold};
use crate::style::discover_style_path;
use crate::ui::UserInterface;

use super::dispatcher::{run_pipeline, Command, CommandResult};

/// The generate command implementation.
pub struct GenerateCommand {
    config: Option<PathBuf>,
    args: GenerateArgs,
}

impl GenerateCommand {
    /// Create a new generate command.
    pub fn new(config: Option<PathBuf>, args: GenerateArgs) -> Self {
        Self { config, args }
    }
}

impl Command for GenerateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        // Resolve first; an invalid document must not leave a scaffold behind.
        if let Err(e) = run_pipeline(self.config.as_deref(), &HashMap::new()) {
            match e {
                ClispecError::Resolve(err) => {
                    for line in err.report().lines() {
                        ui.error(line);
                    }
                    return Ok(CommandResult::failure(1));
                }
                ClispecError::ConfigNotFound { path } => {
                    ui.error(&format!(
                        "No spec document found at {}. Use --config or set CLISPEC_APP_CONFIG.",
                        path.display()
                    ));
                    return Ok(CommandResult::failure(2));
                }
                ClispecError::ConfigParseError { path, message } => {
                    ui.error(&format!("Parse error in {}: {}", path.display(), message));
                    return Ok(CommandResult::failure(1));
                }
                ClispecError::InvalidDocument { message } => {
                    ui.error(&format!("Invalid document: {message}"));
                    return Ok(CommandResult::failure(1));
                }
                other => return Err(other),
            }
        }

        let written = match generate_scaffold(&self.args.out, &self.args.package) {
            Ok(written) => written,
            Err(ClispecError::ScaffoldError { path, message }) => {
                ui.error(&format!("Failed to generate scaffold at {}: {}", path.display(), message));
                return Ok(CommandResult::failure(1));
            }
            Err(e) => return Err(e),
        };

        ui.success(&format!(
            "Generated scaffold at {} ({} files)",
            self.args.out.display(),
            written.len()
        ));

        if let Some(style) = discover_style_path(self.args.style_file.as_deref()) {
            ui.message(&format!("Using style file: {}", style.display()));
        }

        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let instructions = generate_instructions(detect_packaging(&cwd), &self.args.package);
        ui.message("");
        ui.message(&format!(
            "Integration instructions ({}):",
            instructions.packaging
        ));
        ui.message(&instructions.install_snippet);
        ui.message(&instructions.entrypoint_snippet);
        ui.message(&instructions.ci_snippet);

        Ok(CommandResult::success())
    }
}
