//! Type checking of resolved values.
//!
//! Every field with a value is checked against its declared type; every
//! missing field is checked against `required`. Values that arrived as
//! text (environment variables, CLI input) are accepted when they parse
//! as the declared scalar kind, and a text value for a `list` type is
//! split on commas before element checks. Declared defaults get no such
//! leniency; they must already carry the declared type.
//!
//! All violations across all fields are collected before reporting.

use serde_json::Value;

use crate::config::schema::TypeSpec;

use super::diagnostics::{Diagnostic, ResolveError, Stage};
use super::values::{ResolvedValues, ValueSource};

/// Check every resolved field. Aggregates all violations.
pub fn check(values: &ResolvedValues) -> Result<(), ResolveError> {
    let mut diagnostics = Vec::new();

    for field in values.fields() {
        match &field.value {
            None => {
                if field.required {
                    diagnostics.push(Diagnostic::RequiredFieldMissing {
                        scope: field.scope.clone(),
                        field: field.id.clone(),
                    });
                }
            }
            Some(value) => {
                let textual = matches!(
                    field.source,
                    Some(ValueSource::EnvOverride | ValueSource::Env | ValueSource::Cli)
                );
                if !matches(&field.ty, value, textual) {
                    diagnostics.push(Diagnostic::TypeMismatch {
                        scope: field.scope.clone(),
                        field: field.id.clone(),
                        expected: field.ty.name(),
                        actual: value.clone(),
                    });
                }
            }
        }
    }

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(ResolveError::new(Stage::Types, diagnostics))
    }
}

/// Does `value` match the declared type? `textual` allows string parsing
/// for values that arrived as text.
fn matches(ty: &TypeSpec, value: &Value, textual: bool) -> bool {
    match ty {
        TypeSpec::String => value.is_string(),
        TypeSpec::Boolean => match value {
            Value::Bool(_) => true,
            Value::String(s) if textual => {
                matches!(s.as_str(), "true" | "false" | "1" | "0")
            }
            _ => false,
        },
        TypeSpec::Count => match value {
            Value::Number(n) => n.as_u64().is_some(),
            Value::String(s) if textual => s.parse::<u64>().is_ok(),
            _ => false,
        },
        TypeSpec::Enum { values } => {
            if values.contains(value) {
                return true;
            }
            match value {
                Value::String(s) if textual => values.iter().any(|v| stringified(v) == *s),
                _ => false,
            }
        }
        TypeSpec::Path { must_exist } => {
            string_path(value).is_some_and(|p| !must_exist || std::path::Path::new(p).exists())
        }
        TypeSpec::Dir { must_exist } => {
            string_path(value).is_some_and(|p| !must_exist || std::path::Path::new(p).is_dir())
        }
        TypeSpec::File { must_exist } => {
            string_path(value).is_some_and(|p| !must_exist || std::path::Path::new(p).is_file())
        }
        TypeSpec::List { of } => match value {
            Value::Array(items) => items.iter().all(|item| matches(of, item, textual)),
            Value::String(s) if textual => s
                .split(',')
                .all(|item| matches(of, &Value::String(item.trim().to_string()), true)),
            _ => false,
        },
    }
}

fn string_path(value: &Value) -> Option<&str> {
    value.as_str()
}

fn stringified(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
