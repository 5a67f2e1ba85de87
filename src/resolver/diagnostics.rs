//! Structured diagnostics produced by the resolution pipeline.
//!
//! Each pipeline stage reports its problems as [`Diagnostic`] values and
//! fails with a [`ResolveError`] that aggregates every diagnostic found
//! in that stage. Diagnostics carry enough context (scope path, field id,
//! offending value or expression) to point at the exact location in the
//! source document; cycle diagnostics carry the full chain visited.

use serde_json::Value;
use thiserror::Error;

/// Pipeline stage identifiers, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    References,
    Variables,
    Unions,
    Defaults,
    Values,
    Types,
    Constraints,
    Schema,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::References => "reference resolution",
            Stage::Variables => "variable resolution",
            Stage::Unions => "union building",
            Stage::Defaults => "default validation",
            Stage::Values => "value resolution",
            Stage::Types => "type checking",
            Stage::Constraints => "constraint checking",
            Stage::Schema => "schema validation",
        };
        f.write_str(name)
    }
}

/// A dotted path into the document, used to name the scope a diagnostic
/// belongs to (e.g. `objects.address.actions.create`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopePath(Vec<String>);

impl ScopePath {
    /// The document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Extend the path with one segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for ScopePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0.join("."))
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ScopePath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A single problem found by a pipeline stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    /// A `$ref` pointer does not resolve to an existing blueprint.
    #[error("{scope}: unresolved $ref `{pointer}`")]
    UnresolvedReference { scope: ScopePath, pointer: String },

    /// Nested `$ref` expansion revisited a pointer or exceeded the depth bound.
    #[error("reference cycle: {}", .chain.join(" -> "))]
    ReferenceCycle { chain: Vec<String> },

    /// A `{{path}}` expression has no value in local scope or `shared_defs.vars`.
    #[error("{scope}: undefined variable `{path}`")]
    UndefinedVariable { scope: ScopePath, path: String },

    /// Variable expansion did not reach a fixed point within the iteration bound.
    #[error("{scope}: variable expansion never stabilized: {}", .chain.join(" -> "))]
    VariableCycle { scope: ScopePath, chain: Vec<String> },

    /// `default_action`/`default_object` names an id outside the built union.
    #[error("{scope}: `{field}: {value}` does not name a known entry")]
    InvalidDefault {
        scope: ScopePath,
        field: String,
        value: String,
    },

    /// A resolved value does not match the field's declared type.
    #[error("{scope}.{field}: expected {expected}, got `{actual}`")]
    TypeMismatch {
        scope: ScopePath,
        field: String,
        expected: String,
        actual: Value,
    },

    /// A required field resolved to no value at all.
    #[error("{scope}.{field}: required field has no value")]
    RequiredFieldMissing { scope: ScopePath, field: String },

    /// A structural or custom constraint was violated.
    #[error("{scope}: [{rule}] {message}")]
    ConstraintViolation {
        scope: ScopePath,
        rule: String,
        message: String,
    },

    /// A constraint references an id that does not exist in its scope.
    #[error("{scope}: constraint references unknown id `{id}`")]
    UnknownConstraintTarget { scope: ScopePath, id: String },

    /// The external JSON Schema validator rejected the resolved document.
    #[error("schema violation at {path}: {message}")]
    SchemaValidation { path: String, message: String },
}

/// Failure of one pipeline stage, aggregating every diagnostic the stage
/// produced before stopping.
#[derive(Debug, Error)]
#[error("{stage} failed with {} issue(s)", .diagnostics.len())]
pub struct ResolveError {
    /// The stage that failed.
    pub stage: Stage,
    /// All problems found in that stage.
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolveError {
    /// Create a stage failure from collected diagnostics.
    pub fn new(stage: Stage, diagnostics: Vec<Diagnostic>) -> Self {
        Self { stage, diagnostics }
    }

    /// Render every diagnostic as its own line, for CLI reporting.
    pub fn report(&self) -> String {
        let mut out = format!("{}:", self);
        for diag in &self.diagnostics {
            out.push_str("\n - ");
            out.push_str(&diag.to_string());
        }
        out
    }
}
