//! Value resolution: environment/CLI/default precedence per field.
//!
//! Each option and positional resolves to its final value by the first
//! matching rule:
//!
//! 1. `env.override_cli` is set and the named variable is set
//! 2. a CLI-supplied value exists for the field id
//! 3. the named variable is set
//! 4. a `default` is declared
//! 5. otherwise the field is missing; required/constraint checks run later
//!
//! When `env.update` is set, the finalized value is written back through
//! the [`Environment`](super::environment::Environment) after resolution.
//! Fields resolve sequentially, so an update is visible to every field
//! resolved after it.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::schema::{ActionSpec, FieldSpec, ObjectSpec, SpecDocument, TypeSpec};

use super::diagnostics::ScopePath;
use super::environment::Environment;

/// Which precedence tier supplied a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Environment variable with `override_cli` set.
    EnvOverride,
    /// Value supplied on the invoking command line.
    Cli,
    /// Environment variable.
    Env,
    /// Declared `default`.
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueSource::EnvOverride => "environment (override)",
            ValueSource::Cli => "cli",
            ValueSource::Env => "environment",
            ValueSource::Default => "default",
        };
        f.write_str(name)
    }
}

/// One field's resolution outcome, with the declaration details the type
/// and constraint checkers need.
#[derive(Debug, Clone)]
pub struct ResolvedField {
    /// Scope of the owning container (e.g. `objects.address.actions.create`).
    pub scope: ScopePath,
    /// Field id within the scope.
    pub id: String,
    /// Declared type.
    pub ty: TypeSpec,
    /// Declared required flag.
    pub required: bool,
    /// Final value, `None` when no tier supplied one.
    pub value: Option<Value>,
    /// Tier that supplied the value.
    pub source: Option<ValueSource>,
}

impl ResolvedField {
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// All fields' resolution outcomes, in document order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedValues {
    fields: Vec<ResolvedField>,
}

impl ResolvedValues {
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    /// Look up one field's outcome by scope and id.
    pub fn get(&self, scope: &ScopePath, id: &str) -> Option<&ResolvedField> {
        self.fields
            .iter()
            .find(|f| &f.scope == scope && f.id == id)
    }

    /// Whether the field resolved to a value.
    pub fn is_present(&self, scope: &ScopePath, id: &str) -> bool {
        self.get(scope, id).is_some_and(ResolvedField::is_present)
    }

    /// All outcomes belonging to one scope.
    pub fn in_scope<'a>(&'a self, scope: &'a ScopePath) -> impl Iterator<Item = &'a ResolvedField> {
        self.fields.iter().filter(move |f| &f.scope == scope)
    }
}

/// Resolve every option and positional in the document.
///
/// `cli_values` maps field id to the value the argument parser collected
/// for this invocation. Never fails; missing values are left for the type
/// checker to judge against `required`.
pub fn resolve(
    spec: &SpecDocument,
    cli_values: &HashMap<String, Value>,
    env: &mut dyn Environment,
) -> ResolvedValues {
    let mut resolver = Resolver {
        cli_values,
        env,
        out: ResolvedValues::default(),
    };

    let global = ScopePath::root().child("global");
    for (id, field) in &spec.global.options {
        resolver.resolve_field(&global, id, field);
    }
    for (id, object) in &spec.objects {
        resolver.resolve_object(&ScopePath::root().child("objects").child(id), object);
    }
    for (id, action) in &spec.actions {
        resolver.resolve_action(&ScopePath::root().child("actions").child(id), action);
    }

    tracing::debug!(fields = resolver.out.fields.len(), "resolved field values");
    resolver.out
}

struct Resolver<'a> {
    cli_values: &'a HashMap<String, Value>,
    env: &'a mut dyn Environment,
    out: ResolvedValues,
}

impl Resolver<'_> {
    fn resolve_object(&mut self, scope: &ScopePath, object: &ObjectSpec) {
        for (id, action) in &object.actions {
            self.resolve_action(&scope.child("actions").child(id), action);
        }
    }

    fn resolve_action(&mut self, scope: &ScopePath, action: &ActionSpec) {
        for (id, field) in &action.options {
            self.resolve_field(scope, id, field);
        }
        for (id, field) in &action.positionals {
            self.resolve_field(scope, id, field);
        }
        for (id, object) in &action.objects {
            self.resolve_object(&scope.child("objects").child(id), object);
        }
    }

    fn resolve_field(&mut self, scope: &ScopePath, id: &str, field: &FieldSpec) {
        let (value, source) = self.pick_value(id, field);

        if let (Some(binding), Some(value)) = (&field.env, &value) {
            if binding.update {
                self.env.set(&binding.var, &env_string(value));
            }
        }

        self.out.fields.push(ResolvedField {
            scope: scope.clone(),
            id: id.to_string(),
            ty: field.ty.clone(),
            required: field.required,
            value,
            source,
        });
    }

    /// First matching precedence tier wins.
    fn pick_value(&self, id: &str, field: &FieldSpec) -> (Option<Value>, Option<ValueSource>) {
        if let Some(binding) = &field.env {
            if binding.override_cli {
                if let Some(value) = self.env.get(&binding.var) {
                    return (Some(Value::String(value)), Some(ValueSource::EnvOverride));
                }
            }
        }

        if let Some(value) = self.cli_values.get(id) {
            return (Some(value.clone()), Some(ValueSource::Cli));
        }

        if let Some(binding) = &field.env {
            if let Some(value) = self.env.get(&binding.var) {
                return (Some(Value::String(value)), Some(ValueSource::Env));
            }
        }

        if let Some(default) = &field.default {
            return (Some(default.clone()), Some(ValueSource::Default));
        }

        (None, None)
    }
}

/// Stringify a resolved value for an environment write-back.
fn env_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(env_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
