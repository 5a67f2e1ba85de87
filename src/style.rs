//! Style file discovery and validation.
//!
//! A style is a declarative projection description (noun-verb, verb-noun,
//! unix, shell) consumed by external renderers. This crate only discovers
//! style files and validates them against the packaged style schema.
//!
//! # Discovery order
//!
//! 1. Explicit `--style-file` path
//! 2. `CLISPEC_STYLE_FILE` environment variable (when the file exists)
//! 3. `./clispec_style.{json,yaml,yml}`

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;

use crate::config::loader::parse_document;
use crate::error::{ClispecError, Result};
use crate::resolver::schema::instance_path;

/// Environment variable naming the style file.
pub const STYLE_ENV_VAR: &str = "CLISPEC_STYLE_FILE";

/// Styles shipped with the renderers; always available.
pub const BUILTIN_STYLES: &[&str] = &["noun-verb", "verb-noun", "unix", "shell"];

/// The packaged style schema.
pub const STYLE_SCHEMA: &str = include_str!("../schema/clispec_style.schema.json");

/// Local file names probed when nothing else is specified.
const LOCAL_CANDIDATES: &[&str] = &["clispec_style.json", "clispec_style.yaml", "clispec_style.yml"];

/// A discovered and validated style file.
#[derive(Debug, Clone)]
pub struct StyleFile {
    /// Declared style name.
    pub name: String,

    /// Where the file was found.
    pub path: PathBuf,

    /// The validated style document.
    pub document: Value,
}

/// Resolve the style file path, `None` when nothing is configured.
pub fn discover_style_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_val) = std::env::var(STYLE_ENV_VAR) {
        if !env_val.is_empty() {
            let path = PathBuf::from(env_val);
            if path.exists() {
                tracing::debug!(path = %path.display(), "style discovered via {STYLE_ENV_VAR}");
                return Some(path);
            }
        }
    }

    LOCAL_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// Load a style file and validate it against the packaged style schema.
///
/// # Errors
///
/// Returns `ConfigNotFound`/`ConfigParseError` for unreadable files and
/// `StyleValidation` (carrying the validator's instance path) for schema
/// violations.
pub fn load_style_file(path: &Path) -> Result<StyleFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ClispecError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ClispecError::Io(e)
        }
    })?;
    let document = parse_document(&content, path)?;

    if let Some(error) = style_validator().iter_errors(&document).next() {
        return Err(ClispecError::StyleValidation {
            path: instance_path(&error.instance_path.to_string()),
            message: error.to_string(),
        });
    }

    let name = document
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(StyleFile {
        name,
        path: path.to_path_buf(),
        document,
    })
}

fn style_validator() -> &'static Validator {
    static VALIDATOR: OnceLock<Validator> = OnceLock::new();
    VALIDATOR.get_or_init(|| {
        let schema: Value =
            serde_json::from_str(STYLE_SCHEMA).expect("packaged style schema is valid JSON");
        jsonschema::validator_for(&schema).expect("packaged style schema compiles")
    })
}
