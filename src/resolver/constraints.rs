//! Constraint checking across scopes.
//!
//! Evaluates the structural constraint kinds (`requires`, `conflicts`,
//! `exactly_one_of`, `at_least_one_of`) and custom predicates per scope:
//! the global options, every object, and every action. "Present" means
//! the field resolved to a value during value resolution.
//!
//! Constraint ids must name fields of the same scope; global options are
//! visible from every scope. Unknown ids are reported eagerly, whether or
//! not the constraint would have triggered. Violations across all scopes
//! are aggregated before reporting.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::schema::{ActionSpec, ConstraintSet, ObjectSpec, SpecDocument};

use super::diagnostics::{Diagnostic, ResolveError, ScopePath, Stage};
use super::predicate::Predicate;
use super::values::{ResolvedField, ResolvedValues};

/// Check every scope's constraints. Aggregates all violations.
pub fn check(spec: &SpecDocument, values: &ResolvedValues) -> Result<(), ResolveError> {
    let global_scope = ScopePath::root().child("global");
    let globals: HashMap<&str, &ResolvedField> = values
        .fields()
        .iter()
        .filter(|f| f.scope == global_scope)
        .map(|f| (f.id.as_str(), f))
        .collect();

    let mut checker = Checker {
        values,
        globals: &globals,
        diagnostics: Vec::new(),
    };

    checker.check_scope(
        &global_scope,
        &spec.global.constraints,
        ScopeFields::new(&globals, Vec::new()),
    );
    for (id, object) in &spec.objects {
        checker.check_object(&ScopePath::root().child("objects").child(id), object);
    }
    for (id, action) in &spec.actions {
        checker.check_action(&ScopePath::root().child("actions").child(id), action);
    }

    if checker.diagnostics.is_empty() {
        Ok(())
    } else {
        Err(ResolveError::new(Stage::Constraints, checker.diagnostics))
    }
}

/// Field visibility for one scope: local fields shadow globals.
struct ScopeFields<'a> {
    globals: &'a HashMap<&'a str, &'a ResolvedField>,
    locals: Vec<&'a ResolvedField>,
}

impl<'a> ScopeFields<'a> {
    fn new(globals: &'a HashMap<&'a str, &'a ResolvedField>, locals: Vec<&'a ResolvedField>) -> Self {
        Self { globals, locals }
    }

    fn lookup(&self, id: &str) -> Option<&'a ResolvedField> {
        self.locals
            .iter()
            .find(|f| f.id == id)
            .copied()
            .or_else(|| self.globals.get(id).copied())
    }

    fn knows(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }

    fn is_present(&self, id: &str) -> bool {
        self.lookup(id).is_some_and(ResolvedField::is_present)
    }

    fn value(&self, id: &str) -> Option<Value> {
        self.lookup(id).and_then(|f| f.value.clone())
    }
}

struct Checker<'a> {
    values: &'a ResolvedValues,
    globals: &'a HashMap<&'a str, &'a ResolvedField>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Checker<'a> {
    fn check_object(&mut self, scope: &ScopePath, object: &ObjectSpec) {
        // An object's constraint ids resolve against its actions' fields.
        let mut locals = Vec::new();
        for id in object.actions.keys() {
            let action_scope = scope.child("actions").child(id);
            locals.extend(
                self.values
                    .fields()
                    .iter()
                    .filter(|f| f.scope == action_scope),
            );
        }
        self.check_scope(
            scope,
            &object.constraints,
            ScopeFields::new(self.globals, locals),
        );

        for (id, action) in &object.actions {
            self.check_action(&scope.child("actions").child(id), action);
        }
    }

    fn check_action(&mut self, scope: &ScopePath, action: &ActionSpec) {
        let locals: Vec<&ResolvedField> = self
            .values
            .fields()
            .iter()
            .filter(|f| &f.scope == scope)
            .collect();
        self.check_scope(
            scope,
            &action.constraints,
            ScopeFields::new(self.globals, locals),
        );

        for (id, object) in &action.objects {
            self.check_object(&scope.child("objects").child(id), object);
        }
    }

    fn check_scope(&mut self, scope: &ScopePath, constraints: &ConstraintSet, fields: ScopeFields<'_>) {
        if constraints.is_empty() {
            return;
        }

        for id in &constraints.requires {
            if !self.known(scope, &fields, id) {
                continue;
            }
            if !fields.is_present(id) {
                self.violation(scope, "requires", format!("missing `{id}`"));
            }
        }

        for group in &constraints.conflicts {
            if !self.known_group(scope, &fields, group) {
                continue;
            }
            let present: Vec<&String> =
                group.iter().filter(|id| fields.is_present(id)).collect();
            if present.len() > 1 {
                self.violation(
                    scope,
                    "conflicts",
                    format!("{} may not appear together", join(&present)),
                );
            }
        }

        for group in &constraints.exactly_one_of {
            if !self.known_group(scope, &fields, group) {
                continue;
            }
            let count = group.iter().filter(|id| fields.is_present(id)).count();
            if count != 1 {
                self.violation(
                    scope,
                    "exactly_one_of",
                    format!("exactly one of {} required, {count} present", join_all(group)),
                );
            }
        }

        for group in &constraints.at_least_one_of {
            if !self.known_group(scope, &fields, group) {
                continue;
            }
            if !group.iter().any(|id| fields.is_present(id)) {
                self.violation(
                    scope,
                    "at_least_one_of",
                    format!("at least one of {} required", join_all(group)),
                );
            }
        }

        for custom in &constraints.custom {
            let predicate = match Predicate::parse(&custom.predicate) {
                Ok(predicate) => predicate,
                Err(reason) => {
                    tracing::warn!(%scope, %reason, "unparseable custom predicate");
                    self.diagnostics.push(Diagnostic::UnknownConstraintTarget {
                        scope: scope.clone(),
                        id: custom.predicate.clone(),
                    });
                    continue;
                }
            };

            let mut all_known = true;
            for id in predicate.ids() {
                if !self.known(scope, &fields, id) {
                    all_known = false;
                }
            }
            if !all_known {
                continue;
            }

            let lookup = |id: &str| fields.value(id);
            if !predicate.eval(&lookup) {
                self.violation(scope, "custom", custom.message.clone());
            }
        }
    }

    /// Report an unknown constraint target once, returning whether `id` is known.
    fn known(&mut self, scope: &ScopePath, fields: &ScopeFields<'_>, id: &str) -> bool {
        if fields.knows(id) {
            return true;
        }
        self.diagnostics.push(Diagnostic::UnknownConstraintTarget {
            scope: scope.clone(),
            id: id.to_string(),
        });
        false
    }

    fn known_group(&mut self, scope: &ScopePath, fields: &ScopeFields<'_>, group: &[String]) -> bool {
        let mut all = true;
        for id in group {
            if !self.known(scope, fields, id) {
                all = false;
            }
        }
        all
    }

    fn violation(&mut self, scope: &ScopePath, rule: &str, message: String) {
        self.diagnostics.push(Diagnostic::ConstraintViolation {
            scope: scope.clone(),
            rule: rule.to_string(),
            message,
        });
    }
}

fn join(ids: &[&String]) -> String {
    ids.iter()
        .map(|id| format!("`{id}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_all(ids: &[String]) -> String {
    ids.iter()
        .map(|id| format!("`{id}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
