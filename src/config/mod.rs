//! Spec document loading and model.
//!
//! This module covers everything up to the resolution pipeline:
//! - Document model types in [`schema`]
//! - File discovery and JSON/YAML loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use clispec::config::parse_document;
//! use std::path::Path;
//!
//! let doc = parse_document("objects: {}\nactions: {}", Path::new("app.yaml")).unwrap();
//! assert!(doc["objects"].is_object());
//! ```

pub mod loader;
pub mod schema;

// Schema re-exports
pub use schema::{
    ActionSpec, ConstraintSet, CustomConstraint, DisplayNames, EnvBinding, FieldKind, FieldSpec,
    GlobalSpec, ObjectSpec, SharedDefs, SpecDocument, TypeSpec,
};

// Loader re-exports
pub use loader::{discover_config_path, load_document, parse_document, CONFIG_ENV_VAR};
