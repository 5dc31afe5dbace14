//! Command-line interface definition.
//!
//! - `brisk dev` - Pre-bundle dependencies if needed, then serve the project
//! - `brisk optimize` - Pre-bundle dependencies and exit

mod commands;
mod tests;

use clap::Parser;

pub use commands::{Command, DevArgs, OptimizeArgs, ProjectArgs};

/// brisk - a no-bundle dev server for ES modules and Vue components
#[derive(Parser, Debug)]
#[command(
    name = "brisk",
    version,
    about = "A no-bundle dev server for ES modules and Vue components",
    long_about = "brisk serves your source files as native ES modules.\n\
                  Dependencies are pre-bundled once into node_modules/.brisk, bare imports\n\
                  are rewritten on request and .vue components are compiled on the fly."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
