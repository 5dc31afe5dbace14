use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available brisk subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the development server
    ///
    /// Pre-bundles dependencies on the first run, then serves the project
    /// root with bare imports rewritten and .vue files compiled per request.
    Dev(DevArgs),

    /// Pre-bundle dependencies without starting the server
    ///
    /// Does nothing when the cache directory already exists. Delete it to
    /// force a rebuild.
    Optimize(OptimizeArgs),
}

/// Options shared by every command that works on a project.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to a config file (defaults to <root>/brisk.config.json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Value of process.env.NODE_ENV in pre-bundled dependencies
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,
}

/// Arguments for the dev command
#[derive(Args, Debug, Clone, Default)]
pub struct DevArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Port to listen on
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Interface to listen on
    ///
    /// Use 0.0.0.0 to expose the server on the local network.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,
}

/// Arguments for the optimize command
#[derive(Args, Debug, Clone, Default)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}
