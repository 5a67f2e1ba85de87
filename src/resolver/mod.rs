//! The resolution pipeline.
//!
//! A raw document flows through eight sequential stages, each consuming
//! and producing an immutable snapshot:
//!
//! 1. [`refs`] - `$ref` expansion against `shared_defs`, use-site merges
//! 2. [`vars`] - `{{path}}` variable substitution with scoped lookup
//! 3. [`unions`] - the full sets of object and action ids
//! 4. [`defaults`] - `default_action`/`default_object` membership
//! 5. [`values`] - environment/CLI/default precedence per field
//! 6. [`types`] - resolved values against declared types
//! 7. [`constraints`] - cross-field logical constraints
//! 8. [`schema`] - structural validation via the `jsonschema` crate
//!
//! A stage failure halts the pipeline with that stage's aggregated
//! diagnostics. Stages 1-4 stop at the first structural problem class but
//! report every instance of it; stages 5-7 always run to completion
//! across all fields and scopes.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use clispec::resolver::{resolve, MemoryEnvironment};
//!
//! let raw = serde_json::json!({
//!     "actions": {"list": {"options": {"limit": {"type": "count", "default": 20}}}},
//! });
//! let mut env = MemoryEnvironment::new();
//! let resolution = resolve(&raw, &HashMap::new(), &mut env).unwrap();
//! assert!(resolution.unions.actions.contains("list"));
//! ```

pub mod constraints;
pub mod defaults;
pub mod diagnostics;
pub mod environment;
pub mod predicate;
pub mod refs;
pub mod schema;
pub mod types;
pub mod unions;
pub mod values;
pub mod vars;

pub use diagnostics::{Diagnostic, ResolveError, ScopePath, Stage};
pub use environment::{Environment, MemoryEnvironment, ProcessEnvironment};
pub use unions::Unions;
pub use values::{ResolvedField, ResolvedValues, ValueSource};

use std::collections::HashMap;

use serde_json::Value;

use crate::config::schema::SpecDocument;
use crate::error::{ClispecError, Result};

/// Output of a full pipeline run.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resolved raw tree: references expanded, variables rendered.
    pub document: Value,

    /// The same tree, deserialized into the typed model.
    pub spec: SpecDocument,

    /// Object and action id unions.
    pub unions: Unions,

    /// Per-field value resolution outcomes with their source tiers.
    pub values: ResolvedValues,
}

/// Run the full pipeline over a raw document.
///
/// `cli_values` maps field id to the value the invoking command line
/// supplied; `env` is the environment the value resolver reads from and
/// writes back to.
///
/// # Errors
///
/// Returns `ClispecError::Resolve` carrying the failing stage's
/// aggregated diagnostics, or `ClispecError::InvalidDocument` when the
/// expanded tree does not deserialize into the document model.
pub fn resolve(
    raw: &Value,
    cli_values: &HashMap<String, Value>,
    env: &mut dyn Environment,
) -> Result<Resolution> {
    tracing::debug!("expanding references");
    let expanded = refs::expand(raw)?;

    tracing::debug!("rendering variables");
    let document = vars::render(&expanded.document)?;

    let spec: SpecDocument = serde_json::from_value(document.clone()).map_err(|e| {
        ClispecError::InvalidDocument {
            message: e.to_string(),
        }
    })?;

    let unions = unions::build(&spec, &expanded.referenced);

    tracing::debug!("validating defaults");
    defaults::validate(&spec, &unions)?;

    tracing::debug!("resolving field values");
    let values = values::resolve(&spec, cli_values, env);

    tracing::debug!("checking types");
    types::check(&values)?;

    tracing::debug!("checking constraints");
    constraints::check(&spec, &values)?;

    tracing::debug!("validating against the core schema");
    schema::check(&document)?;

    Ok(Resolution {
        document,
        spec,
        unions,
        values,
    })
}
