//! Conversion of CLI errors into miette reports.

use brisk_optimizer::OptimizeError;
use miette::Report;

use crate::error::CliError;

/// Convert a [`CliError`] into a miette [`Report`] for display.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Optimize(OptimizeError::Build { message }) => miette::miette!(
            help = "Check that every package in package.json `dependencies` is installed in node_modules",
            "Dependency pre-bundling failed: {message}"
        ),
        CliError::Optimize(e @ (OptimizeError::ManifestRead { .. } | OptimizeError::ManifestFormat { .. })) => {
            miette::miette!(help = "brisk reads `dependencies` from package.json in the project root", "{e}")
        }
        CliError::Server(msg) => miette::miette!(
            help = "Pick another port with --port or BRISK_PORT",
            "Server error: {msg}"
        ),
        _ => miette::miette!("{}", err),
    }
}
