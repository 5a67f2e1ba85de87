//! Variable resolution: `{{path}}` expansion with scoped lookup.
//!
//! Every string-valued field is scanned for `{{expression}}` tokens. An
//! expression is a dotted path, evaluated first against the enclosing
//! object/action's own fields (with `id` bound to the entry's key), then
//! against `shared_defs.vars`. Substitution is textual and re-runs until
//! a fixed point or until [`MAX_VAR_ITERATIONS`] passes, so a resolved
//! value may itself contain tokens.

use std::collections::HashSet;

use regex::Regex;
use serde_json::{Map, Value};

use super::diagnostics::{Diagnostic, ResolveError, ScopePath, Stage};

/// Bound on repeated expansion passes over one string.
pub const MAX_VAR_ITERATIONS: usize = 10;

const VAR_PATTERN: &str = r"\{\{\s*([A-Za-z0-9_][A-Za-z0-9_.\-]*)\s*\}\}";

/// Expand every `{{path}}` token in the document.
///
/// A document without tokens comes back unchanged. All undefined
/// expressions are collected and reported together; an expansion that
/// never stabilizes aborts with the chain of expressions visited.
pub fn render(doc: &Value) -> Result<Value, ResolveError> {
    let vars = doc
        .pointer("/shared_defs/vars")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut renderer = Renderer {
        vars,
        re: Regex::new(VAR_PATTERN).unwrap(),
        diagnostics: Vec::new(),
        seen_undefined: HashSet::new(),
        cycled: false,
    };

    let rendered = renderer.render_document(doc);

    if !renderer.diagnostics.is_empty() {
        return Err(ResolveError::new(Stage::Variables, renderer.diagnostics));
    }
    Ok(rendered)
}

/// The enclosing object/action used for local lookup.
struct EntityScope {
    /// Snapshot of the entity's own fields, pre-expansion.
    fields: Map<String, Value>,
    /// The entry's key in its containing map.
    id: String,
}

struct Renderer {
    vars: Map<String, Value>,
    re: Regex,
    diagnostics: Vec<Diagnostic>,
    seen_undefined: HashSet<(String, String)>,
    cycled: bool,
}

impl Renderer {
    fn render_document(&mut self, doc: &Value) -> Value {
        let Some(root) = doc.as_object() else {
            return doc.clone();
        };

        let mut out = Map::new();
        for (key, value) in root {
            let path = ScopePath::root().child(key);
            let rendered = match (key.as_str(), value.as_object()) {
                ("objects", Some(entries)) | ("actions", Some(entries)) => {
                    self.render_entity_map(entries, &path)
                }
                // Blueprints stay raw; their tokens only mean something at
                // the use sites reference expansion already instantiated.
                ("shared_defs", Some(_)) => value.clone(),
                _ => self.render_value(value, None, &path),
            };
            out.insert(key.clone(), rendered);
        }
        Value::Object(out)
    }

    fn render_entity_map(&mut self, entries: &Map<String, Value>, path: &ScopePath) -> Value {
        let mut out = Map::new();
        for (id, entry) in entries {
            out.insert(id.clone(), self.render_entity(entry, id, &path.child(id)));
        }
        Value::Object(out)
    }

    /// Render one object/action entry: its own fields form the local scope,
    /// and nested `actions`/`objects` maps switch scope to the inner entry.
    fn render_entity(&mut self, entry: &Value, id: &str, path: &ScopePath) -> Value {
        let Some(fields) = entry.as_object() else {
            return self.render_value(entry, None, path);
        };

        let scope = EntityScope {
            fields: fields.clone(),
            id: id.to_string(),
        };

        let mut out = Map::new();
        for (key, value) in fields {
            let child_path = path.child(key);
            let rendered = match (key.as_str(), value.as_object()) {
                ("actions", Some(entries)) | ("objects", Some(entries)) => {
                    self.render_entity_map(entries, &child_path)
                }
                _ => self.render_value(value, Some(&scope), &child_path),
            };
            out.insert(key.clone(), rendered);
        }
        Value::Object(out)
    }

    fn render_value(&mut self, value: &Value, scope: Option<&EntityScope>, path: &ScopePath) -> Value {
        if self.cycled {
            return value.clone();
        }
        match value {
            Value::String(s) => Value::String(self.render_string(s, scope, path)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.render_value(item, scope, path))
                    .collect(),
            ),
            Value::Object(map) => {
                let mut out = Map::new();
                for (key, inner) in map {
                    out.insert(key.clone(), self.render_value(inner, scope, &path.child(key)));
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }

    fn render_string(&mut self, input: &str, scope: Option<&EntityScope>, path: &ScopePath) -> String {
        let mut current = input.to_string();
        let mut chain: Vec<String> = Vec::new();

        for _ in 0..MAX_VAR_ITERATIONS {
            if !self.re.is_match(&current) {
                return current;
            }

            let mut undefined = false;
            let re = self.re.clone();
            let next = re
                .replace_all(&current, |caps: &regex::Captures| {
                    let expr = &caps[1];
                    match self.lookup(expr, scope) {
                        Some(replacement) => {
                            chain.push(expr.to_string());
                            replacement
                        }
                        None => {
                            undefined = true;
                            self.record_undefined(path, expr);
                            caps[0].to_string()
                        }
                    }
                })
                .to_string();

            if undefined || next == current {
                return next;
            }
            current = next;
        }

        if self.re.is_match(&current) && !self.cycled {
            self.cycled = true;
            self.diagnostics.push(Diagnostic::VariableCycle {
                scope: path.clone(),
                chain,
            });
        }
        current
    }

    fn record_undefined(&mut self, path: &ScopePath, expr: &str) {
        if self
            .seen_undefined
            .insert((path.to_string(), expr.to_string()))
        {
            self.diagnostics.push(Diagnostic::UndefinedVariable {
                scope: path.clone(),
                path: expr.to_string(),
            });
        }
    }

    /// Dotted-path lookup: local entity scope first, then shared vars.
    fn lookup(&self, expr: &str, scope: Option<&EntityScope>) -> Option<String> {
        if let Some(scope) = scope {
            if expr == "id" {
                return Some(scope.id.clone());
            }
            if let Some(value) = traverse(&scope.fields, expr) {
                if let Some(text) = scalar_to_string(value) {
                    return Some(text);
                }
            }
        }
        traverse(&self.vars, expr).and_then(scalar_to_string)
    }
}

fn traverse<'a>(map: &'a Map<String, Value>, expr: &str) -> Option<&'a Value> {
    let mut segments = expr.split('.');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
