//! Default validation: `default_action` and `default_object` targets.
//!
//! Every object's `default_action` must name a member of the built
//! `ACTIONS` union, and every action's `default_object` a member of
//! `OBJECTS`. All violations are collected before failing.

use crate::config::schema::{ActionSpec, ObjectSpec, SpecDocument};

use super::diagnostics::{Diagnostic, ResolveError, ScopePath, Stage};
use super::unions::Unions;

/// Check every declared default against the unions.
pub fn validate(spec: &SpecDocument, unions: &Unions) -> Result<(), ResolveError> {
    let mut diagnostics = Vec::new();

    for (id, object) in &spec.objects {
        check_object(
            object,
            unions,
            ScopePath::root().child("objects").child(id),
            &mut diagnostics,
        );
    }
    for (id, action) in &spec.actions {
        check_action(
            action,
            unions,
            ScopePath::root().child("actions").child(id),
            &mut diagnostics,
        );
    }

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(ResolveError::new(Stage::Defaults, diagnostics))
    }
}

fn check_object(
    object: &ObjectSpec,
    unions: &Unions,
    scope: ScopePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if let Some(default) = &object.default_action {
        if !unions.actions.contains(default) {
            diagnostics.push(Diagnostic::InvalidDefault {
                scope: scope.clone(),
                field: "default_action".into(),
                value: default.clone(),
            });
        }
    }
    for (id, action) in &object.actions {
        check_action(action, unions, scope.child("actions").child(id), diagnostics);
    }
}

fn check_action(
    action: &ActionSpec,
    unions: &Unions,
    scope: ScopePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if let Some(default) = &action.default_object {
        if !unions.objects.contains(default) {
            diagnostics.push(Diagnostic::InvalidDefault {
                scope: scope.clone(),
                field: "default_object".into(),
                value: default.clone(),
            });
        }
    }
    for (id, object) in &action.objects {
        check_object(object, unions, scope.child("objects").child(id), diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn spec(yaml: &str) -> SpecDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn unions(objects: &[&str], actions: &[&str]) -> Unions {
        Unions {
            objects: objects.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            actions: actions.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn valid_defaults_pass() {
        let spec = spec(
            r#"
objects:
  address:
    default_action: create
    actions:
      create: {}
actions:
  list:
    default_object: address
"#,
        );
        let unions = unions(&["address"], &["create", "list"]);
        assert!(validate(&spec, &unions).is_ok());
    }

    #[test]
    fn missing_default_action_is_reported() {
        let spec = spec("objects:\n  o:\n    default_action: missing_id\n");
        let err = validate(&spec, &unions(&[], &["create"])).unwrap_err();

        assert_eq!(err.stage, Stage::Defaults);
        match &err.diagnostics[0] {
            Diagnostic::InvalidDefault { scope, field, value } => {
                assert_eq!(scope.to_string(), "objects.o");
                assert_eq!(field, "default_action");
                assert_eq!(value, "missing_id");
            }
            other => panic!("expected InvalidDefault, got {other:?}"),
        }
    }

    #[test]
    fn all_violations_are_collected() {
        let spec = spec(
            r#"
objects:
  a:
    default_action: gone
  b:
    default_action: also_gone
actions:
  list:
    default_object: nowhere
"#,
        );

        let err = validate(&spec, &unions(&[], &[])).unwrap_err();
        assert_eq!(err.diagnostics.len(), 3);
    }

    #[test]
    fn nested_action_defaults_are_checked() {
        let spec = spec(
            r#"
objects:
  address:
    actions:
      sync:
        default_object: remote
"#,
        );

        let err = validate(&spec, &unions(&["address"], &["sync"])).unwrap_err();
        assert!(matches!(
            &err.diagnostics[0],
            Diagnostic::InvalidDefault { scope, .. }
                if scope.to_string() == "objects.address.actions.sync"
        ));
    }

    #[test]
    fn absent_defaults_are_fine() {
        let spec = spec("objects:\n  o: {}\nactions:\n  a: {}\n");
        assert!(validate(&spec, &unions(&[], &[])).is_ok());
    }
}
