//! Configuration file discovery and loading.
//!
//! This module finds the spec document for the current invocation and
//! parses it into the raw tree the resolution pipeline consumes.
//!
//! # Discovery order
//!
//! 1. `CLISPEC_APP_CONFIG` environment variable (when the file exists)
//! 2. Explicit `--config` path
//! 3. `./.clispec`
//! 4. `./clispec`

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ClispecError, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "CLISPEC_APP_CONFIG";

/// Local file names probed when nothing else is specified.
const LOCAL_CANDIDATES: &[&str] = &[".clispec", "clispec"];

/// Resolve the config path using the discovery rules.
///
/// # Errors
///
/// Returns `ConfigNotFound` when no candidate exists.
pub fn discover_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Ok(env_val) = std::env::var(CONFIG_ENV_VAR) {
        if !env_val.is_empty() {
            let path = PathBuf::from(env_val);
            if path.exists() {
                tracing::debug!(path = %path.display(), "config discovered via {CONFIG_ENV_VAR}");
                return Ok(path);
            }
        }
    }

    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    for candidate in LOCAL_CANDIDATES {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(ClispecError::ConfigNotFound {
        path: PathBuf::from(LOCAL_CANDIDATES[0]),
    })
}

/// Load a spec document from a file path.
///
/// `.yaml`/`.yml` files parse as YAML, `.json` as JSON; anything else is
/// sniffed from the leading character.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the content is invalid.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ClispecError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ClispecError::Io(e)
        }
    })?;

    parse_document(&content, path)
}

/// Parse spec content into the raw tree.
///
/// # Arguments
///
/// * `content` - The document content
/// * `source_path` - Path used for format selection and error reporting
pub fn parse_document(content: &str, source_path: &Path) -> Result<Value> {
    let extension = source_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let value = match extension.as_deref() {
        Some("yaml") | Some("yml") => parse_yaml(content),
        Some("json") => parse_json(content),
        _ => {
            if content.trim_start().starts_with(['{', '[']) {
                parse_json(content)
            } else {
                parse_yaml(content)
            }
        }
    };

    value.map_err(|message| ClispecError::ConfigParseError {
        path: source_path.to_path_buf(),
        message,
    })
}

fn parse_json(content: &str) -> std::result::Result<Value, String> {
    serde_json::from_str(content).map_err(|e| e.to_string())
}

fn parse_yaml(content: &str) -> std::result::Result<Value, String> {
    // Empty YAML parses to null; treat it as an empty document.
    let value: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    if value.is_null() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    if !value.is_object() {
        return Err("document must be a mapping at the top level".into());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_document_parses_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cfg.json");
        fs::write(&path, r#"{"objects": {}, "actions": {}}"#).unwrap();

        let doc = load_document(&path).unwrap();
        assert!(doc["objects"].is_object());
    }

    #[test]
    fn load_document_parses_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cfg.yaml");
        fs::write(&path, "objects:\n  address:\n    default_action: create\n").unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc["objects"]["address"]["default_action"], "create");
    }

    #[test]
    fn extensionless_json_is_sniffed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".clispec");
        fs::write(&path, r#"{"actions": {"list": {}}}"#).unwrap();

        let doc = load_document(&path).unwrap();
        assert!(doc["actions"]["list"].is_object());
    }

    #[test]
    fn extensionless_yaml_is_sniffed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".clispec");
        fs::write(&path, "actions:\n  list: {}\n").unwrap();

        let doc = load_document(&path).unwrap();
        assert!(doc["actions"]["list"].is_object());
    }

    #[test]
    fn empty_yaml_becomes_empty_document() {
        let doc = parse_document("", Path::new("cfg.yaml")).unwrap();
        assert!(doc.as_object().unwrap().is_empty());
    }

    #[test]
    fn non_mapping_yaml_is_rejected() {
        let result = parse_document("- a\n- b\n", Path::new("cfg.yaml"));
        assert!(matches!(result, Err(ClispecError::ConfigParseError { .. })));
    }

    #[test]
    fn invalid_json_reports_parse_error() {
        let result = parse_document("{not json", Path::new("cfg.json"));
        assert!(matches!(result, Err(ClispecError::ConfigParseError { .. })));
    }

    #[test]
    fn load_document_missing_file_reports_not_found() {
        let result = load_document(Path::new("/nonexistent/.clispec"));
        assert!(matches!(result, Err(ClispecError::ConfigNotFound { .. })));
    }

    #[test]
    fn discover_prefers_explicit_path_when_env_unset() {
        let _guard = crate::env_lock();
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("my.yaml");
        fs::write(&explicit, "").unwrap();

        std::env::remove_var(CONFIG_ENV_VAR);
        let found = discover_config_path(Some(&explicit)).unwrap();
        assert_eq!(found, explicit);
    }

    #[test]
    fn discover_env_var_wins_over_explicit() {
        let _guard = crate::env_lock();
        let temp = TempDir::new().unwrap();
        let from_env = temp.path().join("env.yaml");
        fs::write(&from_env, "").unwrap();
        let explicit = temp.path().join("other.yaml");
        fs::write(&explicit, "").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, &from_env);
        let found = discover_config_path(Some(&explicit)).unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(found, from_env);
    }

    #[test]
    fn discover_ignores_env_var_pointing_at_missing_file() {
        let _guard = crate::env_lock();
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("real.yaml");
        fs::write(&explicit, "").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, temp.path().join("gone.yaml"));
        let found = discover_config_path(Some(&explicit)).unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(found, explicit);
    }

    #[test]
    fn discover_without_candidates_reports_not_found() {
        let _guard = crate::env_lock();
        let cwd = std::env::current_dir().unwrap();
        let temp = TempDir::new().unwrap();
        std::env::set_current_dir(temp.path()).unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);

        let result = discover_config_path(None);

        std::env::set_current_dir(cwd).unwrap();
        assert!(matches!(result, Err(ClispecError::ConfigNotFound { .. })));
    }
}
