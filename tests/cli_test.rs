//! Integration tests for the clispec binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SIMPLE_SPEC: &str = r##"
shared_defs:
  vars:
    org: acme
  actions:
    create:
      description: "Create one for {{org}}"
      options:
        force: {type: boolean, default: false}
objects:
  address:
    default_action: create
    actions:
      create:
        $ref: "#/shared_defs/actions/create"
        options:
          name: {type: string, default: home}
actions:
  list:
    options:
      limit:
        type: count
        default: 20
        env: {var: APP_LIMIT, override_cli: true}
"##;

fn setup_project(spec: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".clispec"), spec).unwrap();
    temp
}

fn clispec_in(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("clispec"));
    cmd.current_dir(temp.path());
    cmd.env_remove("CLISPEC_APP_CONFIG");
    cmd.env_remove("CLISPEC_STYLE_FILE");
    cmd.env_remove("APP_LIMIT");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::new(cargo_bin("clispec"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Style-agnostic"));
}

#[test]
fn cli_shows_version() {
    let mut cmd = Command::new(cargo_bin("clispec"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn validate_accepts_discovered_spec() {
    let temp = setup_project(SIMPLE_SPEC);
    let mut cmd = clispec_in(&temp);
    cmd.arg("validate");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("resolves against the core schema"));
}

#[test]
fn validate_reports_stage_diagnostics() {
    let temp = setup_project("objects:\n  o:\n    default_action: missing_id\n");
    let mut cmd = clispec_in(&temp);
    cmd.arg("validate");
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing_id"));
}

#[test]
fn validate_without_spec_exits_two() {
    let temp = TempDir::new().unwrap();
    let mut cmd = clispec_in(&temp);
    cmd.arg("validate");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("No spec document found"));
}

#[test]
fn validate_quiet_suppresses_status_output() {
    let temp = setup_project(SIMPLE_SPEC);
    let mut cmd = clispec_in(&temp);
    cmd.args(["validate", "--quiet"]);
    cmd.assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn validate_honors_explicit_config_flag() {
    let temp = TempDir::new().unwrap();
    let spec = temp.path().join("app.yaml");
    fs::write(&spec, SIMPLE_SPEC).unwrap();

    let mut cmd = clispec_in(&temp);
    cmd.args(["validate", "--config", spec.to_str().unwrap()]);
    cmd.assert().success();
}

#[test]
fn explain_json_prints_expanded_document() {
    let temp = setup_project(SIMPLE_SPEC);
    let mut cmd = clispec_in(&temp);
    cmd.args(["explain", "--format", "json"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Create one for acme"))
        .stdout(predicate::str::contains("force"));
}

#[test]
fn explain_text_shows_value_sources() {
    let temp = setup_project(SIMPLE_SPEC);
    let mut cmd = clispec_in(&temp);
    cmd.args(["explain", "--set", "limit=7"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("actions.list.limit = 7 (cli)"));
}

#[test]
fn explain_env_override_beats_cli_value() {
    let temp = setup_project(SIMPLE_SPEC);
    let mut cmd = clispec_in(&temp);
    cmd.env("APP_LIMIT", "5");
    cmd.args(["explain", "--set", "limit=7"]);
    cmd.assert().success().stdout(predicate::str::contains(
        "actions.list.limit = \"5\" (environment (override))",
    ));
}

#[test]
fn generate_writes_scaffold_crate() {
    let temp = setup_project(SIMPLE_SPEC);
    let mut cmd = clispec_in(&temp);
    cmd.args(["generate", "--out", "generated", "--package", "addressbook"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Generated scaffold"))
        .stdout(predicate::str::contains("Integration instructions"));

    assert!(temp.path().join("generated/Cargo.toml").exists());
    assert!(temp.path().join("generated/src/main.rs").exists());
    assert!(temp.path().join("generated/src/adapter.rs").exists());
}

#[test]
fn generate_fails_on_invalid_spec() {
    let temp = setup_project("objects:\n  o:\n    default_action: nope\n");
    let mut cmd = clispec_in(&temp);
    cmd.args(["generate", "--out", "generated"]);
    cmd.assert().failure();
    assert!(!temp.path().join("generated").exists());
}

#[test]
fn styles_lists_builtins() {
    let temp = TempDir::new().unwrap();
    let mut cmd = clispec_in(&temp);
    cmd.arg("styles");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("noun-verb"))
        .stdout(predicate::str::contains("shell"));
}

#[test]
fn styles_reports_discovered_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("clispec_style.json"),
        r#"{"name": "custom-minimal", "base": "unix"}"#,
    )
    .unwrap();

    let mut cmd = clispec_in(&temp);
    cmd.arg("styles");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("custom-minimal"));
}

#[test]
fn styles_rejects_invalid_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("clispec_style.json"),
        r#"{"base": "freeform"}"#,
    )
    .unwrap();

    let mut cmd = clispec_in(&temp);
    cmd.arg("styles");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

#[test]
fn completions_generates_bash_script() {
    let temp = TempDir::new().unwrap();
    let mut cmd = clispec_in(&temp);
    cmd.args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("clispec"));
}

#[test]
fn env_var_config_discovery_wins() {
    let temp = TempDir::new().unwrap();
    let spec = temp.path().join("elsewhere.yaml");
    fs::write(&spec, SIMPLE_SPEC).unwrap();

    let mut cmd = clispec_in(&temp);
    cmd.env("CLISPEC_APP_CONFIG", spec.to_str().unwrap());
    cmd.arg("validate");
    cmd.assert().success();
}
