//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// clispec - Style-agnostic CLI specification loader and resolver.
#[derive(Debug, Parser)]
#[command(name = "clispec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the spec document (overrides ./.clispec discovery)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full resolution pipeline and report the verdict
    Validate(ValidateArgs),

    /// Show the resolved document and per-field value sources
    Explain(ExplainArgs),

    /// Generate a runnable CLI crate scaffold
    Generate(GenerateArgs),

    /// List built-in styles and any discovered style file
    Styles(StylesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `validate` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ValidateArgs {}

/// Arguments for the `explain` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ExplainArgs {
    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Supply a CLI value for a field, as id=value (repeatable)
    #[arg(long = "set", value_name = "ID=VALUE")]
    pub set: Vec<String>,
}

impl Default for ExplainArgs {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            set: Vec::new(),
        }
    }
}

/// Arguments for the `generate` command.
#[derive(Debug, Clone, clap::Args)]
pub struct GenerateArgs {
    /// Directory to write the scaffold crate into
    #[arg(long, default_value = "./generated_cli")]
    pub out: PathBuf,

    /// Package name for the scaffold crate
    #[arg(long, default_value = "generated_cli")]
    pub package: String,

    /// Style file to reference in the output
    #[arg(long)]
    pub style_file: Option<PathBuf>,
}

impl Default for GenerateArgs {
    fn default() -> Self {
        Self {
            out: PathBuf::from("./generated_cli"),
            package: "generated_cli".to_string(),
            style_file: None,
        }
    }
}

/// Arguments for the `styles` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StylesArgs {
    /// Style file to inspect instead of the discovered one
    #[arg(long)]
    pub style_file: Option<PathBuf>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explain_parses_repeated_set_flags() {
        let cli = Cli::parse_from([
            "clispec", "explain", "--set", "limit=5", "--set", "all=true",
        ]);
        match cli.command {
            Commands::Explain(args) => {
                assert_eq!(args.set, vec!["limit=5", "all=true"]);
                assert_eq!(args.format, "text");
            }
            other => panic!("expected explain, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::parse_from(["clispec", "validate", "--config", "spec.yaml", "--quiet"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("spec.yaml")));
        assert!(cli.quiet);
    }

    #[test]
    fn generate_defaults() {
        let cli = Cli::parse_from(["clispec", "generate"]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.out, PathBuf::from("./generated_cli"));
                assert_eq!(args.package, "generated_cli");
                assert!(args.style_file.is_none());
            }
            other => panic!("expected generate, got {other:?}"),
        }
    }
}
