//! Reference resolution: `$ref` expansion with use-site overrides.
//!
//! Every `$ref` pointer (a local JSON Pointer such as
//! `#/shared_defs/actions/create`) is replaced by the referenced
//! blueprint's fields, then the use site's sibling fields are overlaid.
//!
//! # Merge Rules
//!
//! - Map-valued fields (`options`, `positionals`, `actions`, `objects`)
//!   merge by key: the use-site's key wins, blueprint-only keys carry over
//! - Every other field is replaced wholesale by the use-site value
//! - Blueprints may themselves contain `$ref`, up to a bounded depth

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::diagnostics::{Diagnostic, ResolveError, ScopePath, Stage};

/// Bound on nested `$ref` chains.
pub const MAX_REF_DEPTH: usize = 10;

/// Fields merged key-by-key instead of replaced wholesale.
const MERGED_MAP_FIELDS: &[&str] = &["options", "positionals", "actions", "objects"];

/// Output of reference expansion.
#[derive(Debug, Clone)]
pub struct Expanded {
    /// Document with every `$ref` replaced by its merged expansion.
    pub document: Value,

    /// Pointers that were actually referenced, for the union builder.
    pub referenced: BTreeSet<String>,
}

/// Expand all `$ref` pointers in the document.
///
/// A document without `$ref` markers comes back unchanged. All unresolved
/// pointers are collected and reported together; a pointer chain that
/// revisits itself or exceeds [`MAX_REF_DEPTH`] aborts immediately with
/// the chain visited.
pub fn expand(raw: &Value) -> Result<Expanded, ResolveError> {
    let mut expander = Expander {
        raw,
        referenced: BTreeSet::new(),
        diagnostics: Vec::new(),
    };

    let document = match expander.expand_document() {
        Ok(document) => document,
        Err(chain) => {
            return Err(ResolveError::new(
                Stage::References,
                vec![Diagnostic::ReferenceCycle { chain }],
            ));
        }
    };

    if !expander.diagnostics.is_empty() {
        return Err(ResolveError::new(Stage::References, expander.diagnostics));
    }

    Ok(Expanded {
        document,
        referenced: expander.referenced,
    })
}

/// Resolve a local JSON Pointer (`#/...`) within `doc`.
///
/// Returns `None` for malformed pointers and non-existent paths alike;
/// both surface as unresolved references.
pub fn pointer_get<'a>(doc: &'a Value, pointer: &str) -> Option<&'a Value> {
    let rest = pointer.strip_prefix('#')?;
    if rest.is_empty() {
        return Some(doc);
    }

    let mut current = doc;
    for token in rest.strip_prefix('/')?.split('/') {
        if token.is_empty() {
            return None;
        }
        let token = token.replace("~1", "/").replace("~0", "~");
        current = current.as_object()?.get(&token)?;
    }
    Some(current)
}

struct Expander<'a> {
    raw: &'a Value,
    referenced: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
}

/// Internal abort: the chain of pointers visited when a cycle was hit.
type CycleChain = Vec<String>;

impl Expander<'_> {
    fn expand_document(&mut self) -> Result<Value, CycleChain> {
        let mut document = self.raw.clone();
        let Some(root) = document.as_object_mut() else {
            return Ok(document);
        };

        for section in ["objects", "actions"] {
            if let Some(map) = root.get_mut(section).and_then(Value::as_object_mut) {
                let scope = ScopePath::root().child(section);
                let entries = std::mem::take(map);
                for (id, entry) in entries {
                    let expanded = Self::expand_entry_in(
                        self.raw,
                        &mut self.referenced,
                        &mut self.diagnostics,
                        entry,
                        scope.child(&id),
                    )?;
                    map.insert(id, expanded);
                }
            }
        }

        if let Some(options) = root
            .get_mut("global")
            .and_then(Value::as_object_mut)
            .and_then(|global| global.get_mut("options"))
            .and_then(Value::as_object_mut)
        {
            let scope = ScopePath::root().child("global").child("options");
            let entries = std::mem::take(options);
            for (id, entry) in entries {
                let expanded = Self::expand_entry_in(
                    self.raw,
                    &mut self.referenced,
                    &mut self.diagnostics,
                    entry,
                    scope.child(&id),
                )?;
                options.insert(id, expanded);
            }
        }

        Ok(document)
    }

    /// Expand one keyed entry: resolve its own `$ref` (if any), then
    /// recurse into its map-valued container fields.
    fn expand_entry_in(
        raw: &Value,
        referenced: &mut BTreeSet<String>,
        diagnostics: &mut Vec<Diagnostic>,
        entry: Value,
        scope: ScopePath,
    ) -> Result<Value, CycleChain> {
        let mut chain = Vec::new();
        let mut expanded = Self::expand_node(raw, referenced, diagnostics, entry, &scope, &mut chain)?;

        if let Some(map) = expanded.as_object_mut() {
            for field in MERGED_MAP_FIELDS {
                if let Some(inner) = map.get_mut(*field).and_then(Value::as_object_mut) {
                    let entries = std::mem::take(inner);
                    for (id, child) in entries {
                        let child_scope = scope.child(*field).child(&id);
                        let child =
                            Self::expand_entry_in(raw, referenced, diagnostics, child, child_scope)?;
                        inner.insert(id, child);
                    }
                }
            }
        }

        Ok(expanded)
    }

    /// Resolve the `$ref` at the top of `node`, following nested blueprint
    /// refs, and overlay the use-site siblings.
    fn expand_node(
        raw: &Value,
        referenced: &mut BTreeSet<String>,
        diagnostics: &mut Vec<Diagnostic>,
        node: Value,
        scope: &ScopePath,
        chain: &mut Vec<String>,
    ) -> Result<Value, CycleChain> {
        let Some(map) = node.as_object() else {
            return Ok(node);
        };
        let Some(pointer) = map.get("$ref").and_then(Value::as_str).map(str::to_string) else {
            return Ok(node);
        };

        if chain.contains(&pointer) || chain.len() >= MAX_REF_DEPTH {
            let mut cycle = chain.clone();
            cycle.push(pointer);
            return Err(cycle);
        }
        chain.push(pointer.clone());

        let base = match pointer_get(raw, &pointer) {
            Some(base) if base.is_object() => base.clone(),
            _ => {
                diagnostics.push(Diagnostic::UnresolvedReference {
                    scope: scope.clone(),
                    pointer,
                });
                // Drop the marker so one pass never leaves $ref behind.
                let mut rest = map.clone();
                rest.remove("$ref");
                return Ok(Value::Object(rest));
            }
        };
        referenced.insert(pointer);

        let base = Self::expand_node(raw, referenced, diagnostics, base, scope, chain)?;

        let mut overrides = map.clone();
        overrides.remove("$ref");
        Ok(merge_use_site(base, overrides, scope))
    }
}

/// Overlay use-site fields onto an expanded blueprint.
fn merge_use_site(base: Value, overrides: Map<String, Value>, scope: &ScopePath) -> Value {
    let mut merged = match base {
        Value::Object(map) => map,
        other => return other,
    };

    for (key, value) in overrides {
        let mergeable = MERGED_MAP_FIELDS.contains(&key.as_str())
            && merged.get(&key).is_some_and(Value::is_object)
            && value.is_object();

        if mergeable {
            if let (Value::Object(entries), Some(Value::Object(target))) =
                (value, merged.get_mut(&key))
            {
                for (id, entry) in entries {
                    if target.contains_key(&id) {
                        tracing::debug!(%scope, field = %key, %id, "use-site key overrides blueprint entry");
                    }
                    target.insert(id, entry);
                }
            }
        } else {
            merged.insert(key, value);
        }
    }

    Value::Object(merged)
}
