//! Integration tests for the resolution pipeline public API.

use std::collections::HashMap;

use clispec::config::TypeSpec;
use clispec::error::ClispecError;
use clispec::resolver::{
    refs, resolve, vars, Diagnostic, MemoryEnvironment, ScopePath, Stage, ValueSource,
};
use serde_json::json;

#[test]
fn reference_resolver_is_identity_without_refs() {
    let doc = json!({
        "objects": {"address": {"actions": {"create": {}}}},
        "actions": {"list": {"options": {"limit": {"type": "count"}}}},
    });

    let expanded = refs::expand(&doc).unwrap();
    assert_eq!(expanded.document, doc);
}

#[test]
fn reference_expansion_is_idempotent() {
    let doc = json!({
        "shared_defs": {"actions": {"create": {"options": {"force": {"type": "boolean"}}}}},
        "objects": {"foo": {"actions": {"create": {"$ref": "#/shared_defs/actions/create"}}}},
    });

    let once = refs::expand(&doc).unwrap();
    let twice = refs::expand(&once.document).unwrap();
    assert_eq!(once.document, twice.document);
}

#[test]
fn variable_resolver_is_identity_without_tokens() {
    let doc = json!({
        "actions": {"list": {"description": "plain text"}},
    });
    assert_eq!(vars::render(&doc).unwrap(), doc);
}

#[test]
fn shared_var_resolves_and_local_scope_wins() {
    let shared_only = json!({
        "shared_defs": {"vars": {"a": {"b": "shared"}}},
        "actions": {"list": {"description": "{{a.b}}"}},
    });
    let rendered = vars::render(&shared_only).unwrap();
    assert_eq!(rendered["actions"]["list"]["description"], "shared");

    let both = json!({
        "shared_defs": {"vars": {"label": "shared"}},
        "actions": {"list": {"label": "local", "description": "{{label}}"}},
    });
    let rendered = vars::render(&both).unwrap();
    assert_eq!(rendered["actions"]["list"]["description"], "local");
}

#[test]
fn self_referential_variable_reports_cycle() {
    let doc = json!({
        "shared_defs": {"vars": {"x": "again {{x}}"}},
        "actions": {"list": {"description": "{{x}}"}},
    });

    let err = vars::render(&doc).unwrap_err();
    assert_eq!(err.stage, Stage::Variables);
    assert!(err
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::VariableCycle { .. })));
}

#[test]
fn invalid_default_names_scope_and_value() {
    let raw = json!({
        "objects": {"o": {"default_action": "missing_id"}},
    });
    let mut env = MemoryEnvironment::new();

    let err = resolve(&raw, &HashMap::new(), &mut env).unwrap_err();
    let ClispecError::Resolve(err) = err else {
        panic!("expected resolve error");
    };
    assert_eq!(err.stage, Stage::Defaults);
    match &err.diagnostics[0] {
        Diagnostic::InvalidDefault { scope, value, .. } => {
            assert_eq!(scope.to_string(), "objects.o");
            assert_eq!(value, "missing_id");
        }
        other => panic!("expected InvalidDefault, got {other:?}"),
    }
}

fn precedence_doc(override_cli: bool) -> serde_json::Value {
    json!({
        "actions": {
            "list": {
                "options": {
                    "limit": {
                        "type": "count",
                        "env": {"var": "X", "override_cli": override_cli},
                    }
                }
            }
        },
    })
}

#[test]
fn env_override_beats_cli_value() {
    let cli = HashMap::from([("limit".to_string(), json!(7))]);
    let mut env = MemoryEnvironment::new().with("X", "5");

    let resolution = resolve(&precedence_doc(true), &cli, &mut env).unwrap();
    let scope: ScopePath = ["actions", "list"].into_iter().collect();
    let field = resolution.values.get(&scope, "limit").unwrap();
    assert_eq!(field.value, Some(json!("5")));
    assert_eq!(field.source, Some(ValueSource::EnvOverride));
}

#[test]
fn cli_beats_env_without_override() {
    let cli = HashMap::from([("limit".to_string(), json!(7))]);
    let mut env = MemoryEnvironment::new().with("X", "5");

    let resolution = resolve(&precedence_doc(false), &cli, &mut env).unwrap();
    let scope: ScopePath = ["actions", "list"].into_iter().collect();
    let field = resolution.values.get(&scope, "limit").unwrap();
    assert_eq!(field.value, Some(json!(7)));
    assert_eq!(field.source, Some(ValueSource::Cli));
}

#[test]
fn default_applies_when_nothing_is_supplied() {
    let raw = json!({
        "actions": {"list": {"options": {"limit": {"type": "count", "default": 3}}}},
    });
    let mut env = MemoryEnvironment::new();

    let resolution = resolve(&raw, &HashMap::new(), &mut env).unwrap();
    let scope: ScopePath = ["actions", "list"].into_iter().collect();
    let field = resolution.values.get(&scope, "limit").unwrap();
    assert_eq!(field.value, Some(json!(3)));
    assert_eq!(field.source, Some(ValueSource::Default));
}

#[test]
fn missing_required_field_fails_type_checking() {
    let raw = json!({
        "actions": {"create": {"options": {"name": {"type": "string", "required": true}}}},
    });
    let mut env = MemoryEnvironment::new();

    let err = resolve(&raw, &HashMap::new(), &mut env).unwrap_err();
    let ClispecError::Resolve(err) = err else {
        panic!("expected resolve error");
    };
    assert_eq!(err.stage, Stage::Types);
    assert!(matches!(
        &err.diagnostics[0],
        Diagnostic::RequiredFieldMissing { field, .. } if field == "name"
    ));
}

#[test]
fn exactly_one_of_with_both_present_reports_one_violation() {
    let raw = json!({
        "actions": {
            "list": {
                "options": {"a": {"type": "boolean"}, "b": {"type": "boolean"}},
                "constraints": {"exactly_one_of": [["a", "b"]]},
            }
        },
    });
    let cli = HashMap::from([("a".to_string(), json!(true)), ("b".to_string(), json!(true))]);
    let mut env = MemoryEnvironment::new();

    let err = resolve(&raw, &cli, &mut env).unwrap_err();
    let ClispecError::Resolve(err) = err else {
        panic!("expected resolve error");
    };
    assert_eq!(err.stage, Stage::Constraints);
    assert_eq!(err.diagnostics.len(), 1);
}

#[test]
fn conflict_with_single_member_present_passes() {
    let raw = json!({
        "actions": {
            "list": {
                "options": {"a": {"type": "boolean"}, "b": {"type": "boolean"}},
                "constraints": {"conflicts": [["a", "b"]]},
            }
        },
    });
    let cli = HashMap::from([("a".to_string(), json!(true))]);
    let mut env = MemoryEnvironment::new();

    assert!(resolve(&raw, &cli, &mut env).is_ok());
}

#[test]
fn blueprint_with_override_resolves_end_to_end() {
    let raw = json!({
        "shared_defs": {
            "actions": {
                "create": {
                    "description": "make one",
                    "options": {"force": {"type": "boolean", "default": false}},
                }
            },
        },
        "objects": {
            "foo": {
                "default_action": "create",
                "actions": {
                    "create": {
                        "$ref": "#/shared_defs/actions/create",
                        "options": {"name": {"type": "string", "required": true}},
                    }
                },
            }
        },
    });
    let cli = HashMap::from([("name".to_string(), json!("widget"))]);
    let mut env = MemoryEnvironment::new();

    let resolution = resolve(&raw, &cli, &mut env).unwrap();

    let create = &resolution.spec.objects["foo"].actions["create"];
    assert!(create.options.contains_key("force"));
    let name = &create.options["name"];
    assert!(name.required);
    assert_eq!(name.ty, TypeSpec::String);

    assert!(resolution.unions.objects.contains("foo"));
    assert!(resolution.unions.actions.contains("create"));
}

#[test]
fn env_update_writes_back_through_the_environment() {
    let raw = json!({
        "actions": {
            "list": {
                "options": {
                    "output": {
                        "type": "string",
                        "default": "text",
                        "env": {"var": "APP_OUTPUT", "update": true},
                    }
                }
            }
        },
    });
    let mut env = MemoryEnvironment::new();

    resolve(&raw, &HashMap::new(), &mut env).unwrap();
    use clispec::resolver::Environment;
    assert_eq!(env.get("APP_OUTPUT"), Some("text".to_string()));
}
