//! Integration instructions for generated scaffolds.
//!
//! Detects the host project's packaging style and builds concise install,
//! entrypoint, and CI snippets users can paste into their project.

use std::path::Path;

/// How the host project is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packaging {
    /// A `Cargo.toml` is present in the project root.
    Cargo,
    /// Fallback when no recognized build file is found.
    Make,
}

impl std::fmt::Display for Packaging {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Packaging::Cargo => f.write_str("cargo"),
            Packaging::Make => f.write_str("make"),
        }
    }
}

/// Install, entrypoint, and CI snippets for one packaging style.
#[derive(Debug, Clone)]
pub struct IntegrationInstructions {
    pub packaging: Packaging,
    pub install_snippet: String,
    pub entrypoint_snippet: String,
    pub ci_snippet: String,
}

/// Detect the host project's packaging style.
pub fn detect_packaging(root: &Path) -> Packaging {
    if root.join("Cargo.toml").exists() {
        Packaging::Cargo
    } else {
        Packaging::Make
    }
}

/// Build the snippets for the given packaging style and scaffold name.
pub fn generate_instructions(packaging: Packaging, package: &str) -> IntegrationInstructions {
    match packaging {
        Packaging::Cargo => IntegrationInstructions {
            packaging,
            install_snippet: format!("cargo install --path {package}"),
            entrypoint_snippet: format!("[workspace]\nmembers = [\"{package}\"]"),
            ci_snippet: format!(
                "cargo fmt --check && cargo clippy -p {package} -- -D warnings && cargo test -p {package}"
            ),
        },
        Packaging::Make => IntegrationInstructions {
            packaging,
            install_snippet: format!("make -C {package} install"),
            entrypoint_snippet: format!("{package}: ; $(MAKE) -C {package} build"),
            ci_snippet: format!("make -C {package} test"),
        },
    }
}
