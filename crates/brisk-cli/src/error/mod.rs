//! Error handling for the brisk CLI.
//!
//! - [`CliError`] is what commands return; library errors convert into it
//!   via `#[from]`.
//! - [`ConfigError`] covers loading and validating configuration.
//!
//! Per-request failures never reach these types; the dev server turns them
//! into HTTP responses.

mod diagnostic;

use std::path::PathBuf;

use brisk_optimizer::OptimizeError;
use thiserror::Error;

pub use diagnostic::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration errors (missing file, invalid values)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dependency pre-bundling failed
    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create brisk.config.json or pass an existing file to --config", .0.display())]
    NotFound(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with the invalid value
        field: String,
        /// The invalid value
        value: String,
        /// How to fix it
        hint: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        field: impl Into<String>,
        value: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            hint: hint.into(),
        }
    }
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
