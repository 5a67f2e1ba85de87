//! Scaffold generation.
//!
//! `clispec generate` writes a minimal runnable cargo binary crate whose
//! entrypoint parses `<object> <action>` and forwards the invocation to a
//! handler registered through an adapter layer. The scaffold has no
//! dependencies of its own; the host project wires real behavior in by
//! registering a handler.

pub mod instructions;

pub use instructions::{detect_packaging, generate_instructions, IntegrationInstructions, Packaging};

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ClispecError, Result};

const MANIFEST_TEMPLATE: &str = r#"[package]
name = "%PACKAGE%"
version = "0.1.0"
edition = "2021"
description = "Generated CLI scaffold"

[dependencies]
"#;

const MAIN_TEMPLATE: &str = r#"//! Command-line entrypoint for the generated CLI scaffold.

mod adapter;

use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (object, action) = match args.as_slice() {
        [object, action, ..] => (object.as_str(), action.as_str()),
        _ => {
            eprintln!("usage: %PACKAGE% <object> <action>");
            return ExitCode::from(2);
        }
    };

    let adapter = adapter::Adapter::new();
    match adapter.invoke(object, action, &args[2..]) {
        Ok(Some(output)) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}
"#;

const ADAPTER_TEMPLATE: &str = r#"//! Adapter layer forwarding object/action invocations to a handler.
//!
//! The generated entrypoint calls `invoke(object, action, rest)`, which
//! delegates to the handler registered via `register`.

/// Processes one `<object> <action>` invocation.
pub trait Handler {
    fn handle(&self, object: &str, action: &str, rest: &[String]) -> Result<Option<String>, String>;
}

/// Holds the registered handler.
#[derive(Default)]
pub struct Adapter {
    handler: Option<Box<dyn Handler>>,
}

impl Adapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler that processes invocations.
    pub fn register(&mut self, handler: Box<dyn Handler>) {
        self.handler = Some(handler);
    }

    /// Invoke the registered handler.
    pub fn invoke(
        &self,
        object: &str,
        action: &str,
        rest: &[String],
    ) -> Result<Option<String>, String> {
        match &self.handler {
            Some(handler) => handler.handle(object, action, rest),
            None => Err(format!(
                "no handler registered for `{object} {action}`; call Adapter::register first"
            )),
        }
    }
}
"#;

/// Write the scaffold crate under `out`, returning the files written.
///
/// # Errors
///
/// Returns `ScaffoldError` for an unusable package name or any write
/// failure.
pub fn generate_scaffold(out: &Path, package: &str) -> Result<Vec<PathBuf>> {
    if !is_valid_package_name(package) {
        return Err(ClispecError::ScaffoldError {
            path: out.to_path_buf(),
            message: format!(
                "`{package}` is not a usable package name (lowercase letters, digits, `-`, `_`)"
            ),
        });
    }

    let files = [
        (out.join("Cargo.toml"), MANIFEST_TEMPLATE),
        (out.join("src/main.rs"), MAIN_TEMPLATE),
        (out.join("src/adapter.rs"), ADAPTER_TEMPLATE),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (path, template) in files {
        write_file(&path, &template.replace("%PACKAGE%", package))?;
        written.push(path);
    }

    tracing::debug!(out = %out.display(), package, "wrote scaffold crate");
    Ok(written)
}

fn is_valid_package_name(package: &str) -> bool {
    !package.is_empty()
        && package
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    let failure = |e: std::io::Error| ClispecError::ScaffoldError {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(failure)?;
    }
    fs::write(path, content).map_err(failure)
}
