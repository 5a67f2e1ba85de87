//! Explain command implementation.
//!
//! The `clispec explain` command runs the pipeline and prints the
//! resolved document, either as JSON or as annotated text showing the
//! union sets and each field's value with the precedence tier that
//! supplied it. `--set id=value` feeds CLI-supplied values into the
//! value resolver.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::cli::args::ExplainArgs;
use crate::error::{ClispecError, Result};
use crate::resolver::Resolution;
use crate::ui::UserInterface;

use super::dispatcher::{run_pipeline, Command, CommandResult};

/// The explain command implementation.
pub struct ExplainCommand {
    config: Option<PathBuf>,
    args: ExplainArgs,
}

impl ExplainCommand {
    /// Create a new explain command.
    pub fn new(config: Option<PathBuf>, args: ExplainArgs) -> Self {
        Self { config, args }
    }

    /// Parse repeated `--set id=value` flags into the CLI value map.
    ///
    /// Values parse as JSON when possible (`5`, `true`, `[1,2]`), else as
    /// plain strings.
    fn cli_values(&self) -> std::result::Result<HashMap<String, Value>, String> {
        let mut values = HashMap::new();
        for entry in &self.args.set {
            let Some((id, raw)) = entry.split_once('=') else {
                return Err(format!("--set expects id=value, got `{entry}`"));
            };
            if id.is_empty() {
                return Err(format!("--set expects id=value, got `{entry}`"));
            }
            let value = serde_json::from_str(raw)
                .unwrap_or_else(|_| Value::String(raw.to_string()));
            values.insert(id.to_string(), value);
        }
        Ok(values)
    }

    fn print_text(&self, ui: &mut dyn UserInterface, path: &std::path::Path, resolution: &Resolution) {
        ui.message(&format!("Config: {}", path.display()));
        ui.message("");
        match serde_json::to_string_pretty(&resolution.document) {
            Ok(pretty) => ui.message(&pretty),
            Err(e) => ui.warning(&format!("document not printable: {e}")),
        }

        ui.message("");
        ui.message(&format!("Objects: {}", join(&resolution.unions.objects)));
        ui.message(&format!("Actions: {}", join(&resolution.unions.actions)));

        if !resolution.values.fields().is_empty() {
            ui.message("");
            ui.message("Resolved values:");
            for field in resolution.values.fields() {
                let line = match (&field.value, &field.source) {
                    (Some(value), Some(source)) => {
                        format!("  {}.{} = {} ({})", field.scope, field.id, value, source)
                    }
                    _ => format!("  {}.{} is missing", field.scope, field.id),
                };
                ui.message(&line);
            }
        }
    }
}

fn join(ids: &std::collections::BTreeSet<String>) -> String {
    if ids.is_empty() {
        "(none)".to_string()
    } else {
        ids.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

impl Command for ExplainCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let cli_values = match self.cli_values() {
            Ok(values) => values,
            Err(message) => {
                ui.error(&message);
                return Ok(CommandResult::failure(2));
            }
        };

        match run_pipeline(self.config.as_deref(), &cli_values) {
            Ok((path, resolution)) => {
                if self.args.format == "json" {
                    match serde_json::to_string_pretty(&resolution.document) {
                        Ok(pretty) => ui.message(&pretty),
                        Err(e) => {
                            ui.error(&format!("document not printable: {e}"));
                            return Ok(CommandResult::failure(1));
                        }
                    }
                } else {
                    self.print_text(ui, &path, &resolution);
                }
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
