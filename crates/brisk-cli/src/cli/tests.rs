#![cfg(test)]

use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use super::*;

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_dev_flags() {
    let cli = Cli::parse_from(["brisk", "dev", "--port", "4000", "--host", "0.0.0.0", "--root", "app"]);
    let Command::Dev(args) = cli.command else {
        panic!("expected dev command");
    };
    assert_eq!(args.port, Some(4000));
    assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
    assert_eq!(args.project.root, Some(PathBuf::from("app")));
    assert_eq!(args.project.config, None);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::parse_from(["brisk", "optimize", "--verbose", "--no-color"]);
    assert!(cli.verbose);
    assert!(cli.no_color);
    assert!(matches!(cli.command, Command::Optimize(_)));
}

#[test]
fn test_port_zero_is_rejected() {
    assert!(Cli::try_parse_from(["brisk", "dev", "--port", "0"]).is_err());
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    assert!(Cli::try_parse_from(["brisk", "-v", "-q", "dev"]).is_err());
}
