//! brisk CLI - no-bundle development server.
//!
//! Parses arguments, initializes logging and dispatches to a command.

use brisk_cli::{cli, commands, error, logger, ui};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args).await,
        cli::Command::Optimize(optimize_args) => commands::optimize_execute(optimize_args).await,
    };

    // Fatal errors are rendered by miette and exit non-zero
    result.map_err(error::cli_error_to_miette)
}
