//! Narrow read/write interface over the process environment.
//!
//! The value resolver reads variables named by `env` bindings and, when
//! `update` is set, writes finalized values back. Routing both through
//! [`Environment`] lets tests substitute an in-memory map instead of
//! mutating process-wide state.

use std::collections::HashMap;

/// Read/write access to environment variables.
pub trait Environment {
    /// Read a variable, `None` when unset.
    fn get(&self, name: &str) -> Option<String>;

    /// Write a variable.
    fn set(&mut self, name: &str, value: &str);
}

/// The real process environment.
///
/// Writes are process-wide shared state; one resolution invocation runs
/// to completion without concurrent writers.
#[derive(Debug, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set(&mut self, name: &str, value: &str) {
        tracing::debug!(var = name, "writing resolved value to environment");
        std::env::set_var(name, value);
    }
}

/// In-memory environment for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnvironment {
    vars: HashMap<String, String>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a variable, builder-style.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }
}

impl Environment for MemoryEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }
}
