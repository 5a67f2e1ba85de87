//! clispec - Style-agnostic declarative CLI specification loader.
//!
//! clispec reads a map-keyed document describing CLI "objects" and
//! "actions" (with their options, positionals, and constraints), resolves
//! references, variables, and environment/CLI value precedence, and
//! validates the result before any rendering or code generation occurs.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Spec document discovery, loading, and model types
//! - [`error`] - Error types and result aliases
//! - [`resolver`] - The eight-stage resolution pipeline
//! - [`scaffold`] - Generated CLI crate scaffolds and integration snippets
//! - [`style`] - Style file discovery and validation
//! - [`ui`] - Terminal output abstraction
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use clispec::resolver::{resolve, MemoryEnvironment};
//!
//! let raw = serde_json::json!({
//!     "objects": {
//!         "address": {
//!             "default_action": "create",
//!             "actions": {"create": {"options": {"name": {"type": "string", "default": "home"}}}},
//!         }
//!     },
//! });
//!
//! let mut env = MemoryEnvironment::new();
//! let resolution = resolve(&raw, &HashMap::new(), &mut env).unwrap();
//! assert!(resolution.unions.objects.contains("address"));
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod resolver;
pub mod scaffold;
pub mod style;
pub mod ui;

pub use error::{ClispecError, Result};

/// Serializes tests that touch the process environment or working
/// directory; both are process-wide state and the test harness runs in
/// parallel.
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
