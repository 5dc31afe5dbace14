//! brisk CLI - a no-bundle development server.
//!
//! Source files are served as they are on disk. The only request-time work is
//! rewriting bare import specifiers to pre-bundled dependency modules and
//! compiling Vue single-file components.
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing with clap
//! - [`config`] - Layered configuration (defaults, `brisk.config.json`, `BRISK_*`, flags)
//! - [`dev`] - Request transform dispatcher and the axum server around it
//! - [`commands`] - `brisk dev` and `brisk optimize`
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal status lines
//!
//! # Example
//!
//! ```rust,no_run
//! use brisk_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
