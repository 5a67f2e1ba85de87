//! Error types for clispec operations.
//!
//! This module defines [`ClispecError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `ClispecError` for domain-specific errors that need distinct handling
//! - Resolution failures carry the full set of stage diagnostics in
//!   [`ResolveError`](crate::resolver::ResolveError)
//! - Use `anyhow::Error` (via `ClispecError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

use crate::resolver::ResolveError;

/// Core error type for clispec operations.
#[derive(Debug, Error)]
pub enum ClispecError {
    /// Configuration file not found at any discovery location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// The parsed document does not have the shape of a spec document.
    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    /// A style file failed validation against the style schema.
    #[error("Style schema validation failed at {path}: {message}")]
    StyleValidation { path: String, message: String },

    /// The resolution pipeline failed; carries stage diagnostics.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Scaffold generation failed.
    #[error("Failed to generate scaffold at {path}: {message}")]
    ScaffoldError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for clispec operations.
pub type Result<T> = std::result::Result<T, ClispecError>;
