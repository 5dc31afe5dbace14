//! Command implementations.
//!
//! - [`dev`] - Pre-bundle, then run the development server
//! - [`optimize`] - Pre-bundle only

pub mod dev;
pub mod optimize;

pub use dev::execute as dev_execute;
pub use optimize::execute as optimize_execute;

use std::time::Instant;

use brisk_optimizer::{OptimizeOutcome, ensure_bundled};

use crate::config::BriskConfig;
use crate::error::Result;
use crate::ui;

/// Run the pre-bundler for `config` and report the outcome.
pub(crate) async fn prebundle(config: &BriskConfig) -> Result<OptimizeOutcome> {
    let options = config.optimizer_options();
    let started = Instant::now();

    let outcome = ensure_bundled(&options).await?;
    if outcome.skipped {
        ui::info(&format!(
            "Using pre-bundled dependencies in {}",
            options.cache_path().display()
        ));
    } else {
        ui::success(&format!(
            "Pre-bundled dependencies in {}",
            ui::format_duration(started.elapsed())
        ));
    }
    Ok(outcome)
}

/// Current directory, used to resolve relative paths in configuration.
pub(crate) fn current_dir() -> Result<std::path::PathBuf> {
    Ok(std::env::current_dir()?)
}
