//! Styles command implementation.
//!
//! The `clispec styles` command lists the built-in styles and reports any
//! discovered style file, validating it against the style schema.

use crate::cli::args::StylesArgs;
use crate::error::Result;
use crate::style::{discover_style_path, load_style_file, BUILTIN_STYLES};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The styles command implementation.
pub struct StylesCommand {
    args: StylesArgs,
}

impl StylesCommand {
    /// Create a new styles command.
    pub fn new(args: StylesArgs) -> Self {
        Self { args }
    }
}

impl Command for StylesCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.message("Built-in styles:");
        for style in BUILTIN_STYLES {
            ui.message(&format!("  - {style}"));
        }

        match discover_style_path(self.args.style_file.as_deref()) {
            None => Ok(CommandResult::success()),
            Some(path) => match load_style_file(&path) {
                Ok(style) => {
                    ui.message(&format!(
                        "Discovered style file: {} ({})",
                        path.display(),
                        style.name
                    ));
                    Ok(CommandResult::success())
                }
                Err(e) => {
                    ui.error(&format!("Style file {} is invalid: {}", path.display(), e));
                    Ok(CommandResult::failure(1))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn lists_builtin_styles() {
        let temp = TempDir::new().unwrap();
        let cmd = StylesCommand::new(StylesArgs {
            // Point at a non-discovering location so local files don't leak in.
            style_file: Some(temp.path().join("none.json")),
        });
        let mut ui = MockUI::new();

        // Missing explicit file is invalid, but the built-ins still list.
        cmd.execute(&mut ui).unwrap();

        assert!(ui.has_message("noun-verb"));
        assert!(ui.has_message("verb-noun"));
        assert!(ui.has_message("unix"));
        assert!(ui.has_message("shell"));
    }

    #[test]
    fn reports_valid_explicit_style_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("style.json");
        fs::write(&path, r#"{"name": "custom-minimal"}"#).unwrap();

        let cmd = StylesCommand::new(StylesArgs {
            style_file: Some(path),
        });
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("custom-minimal"));
    }

    #[test]
    fn invalid_style_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("style.json");
        fs::write(&path, r#"{"base": "unix"}"#).unwrap();

        let cmd = StylesCommand::new(StylesArgs {
            style_file: Some(path),
        });
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(!result.success);
        assert!(ui.has_error("invalid"));
    }
}
