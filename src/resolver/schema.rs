//! Final structural validation against the packaged core schema.
//!
//! The fully resolved document is handed to the `jsonschema` crate,
//! configured with `schema/clispec.schema.json` (embedded at compile
//! time). Validator findings are relayed with their native instance path
//! and message, not reinterpreted.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;

use super::diagnostics::{Diagnostic, ResolveError, Stage};

/// The authoritative core document schema, packaged with the crate.
pub const CORE_SCHEMA: &str = include_str!("../../schema/clispec.schema.json");

fn core_validator() -> &'static Validator {
    static VALIDATOR: OnceLock<Validator> = OnceLock::new();
    VALIDATOR.get_or_init(|| {
        let schema: Value =
            serde_json::from_str(CORE_SCHEMA).expect("packaged core schema is valid JSON");
        jsonschema::validator_for(&schema).expect("packaged core schema compiles")
    })
}

/// Validate the resolved document, relaying every validator finding.
pub fn check(document: &Value) -> Result<(), ResolveError> {
    let diagnostics: Vec<Diagnostic> = core_validator()
        .iter_errors(document)
        .map(|error| Diagnostic::SchemaValidation {
            path: instance_path(&error.instance_path.to_string()),
            message: error.to_string(),
        })
        .collect();

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(ResolveError::new(Stage::Schema, diagnostics))
    }
}

/// The validator reports the document root as an empty path.
pub(crate) fn instance_path(raw: &str) -> String {
    if raw.is_empty() {
        "/".to_string()
    } else {
        raw.to_string()
    }
}
