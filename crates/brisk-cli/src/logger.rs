//! Logging infrastructure for the brisk CLI.
//!
//! Libraries only emit `tracing` events; the subscriber is installed here,
//! once, by the binary.
//!
//! ```rust,no_run
//! use brisk_cli::logger::init_logger;
//! use tracing::{debug, info};
//!
//! init_logger(false, false, false);
//!
//! info!("Starting dev server");
//! debug!(path = "/src/main.js", "transformed");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown by default.
const BRISK_CRATES: &[&str] = &["brisk_cli", "brisk_optimizer", "brisk_rewrite", "brisk_plugin_vue"];

/// Initialize the tracing subscriber.
///
/// The level is chosen in this order:
/// 1. `--verbose`: DEBUG for brisk crates
/// 2. `--quiet`: ERROR only
/// 3. `RUST_LOG`, when set and valid
/// 4. INFO for brisk crates
///
/// Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        brisk_filter("debug")
    } else if quiet {
        brisk_filter("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| brisk_filter("info"))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// A filter enabling `level` for every brisk crate and nothing else.
pub fn brisk_filter(level: &str) -> EnvFilter {
    EnvFilter::new(filter_directives(level))
}

fn filter_directives(level: &str) -> String {
    BRISK_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
