//! Command-line interface for parklot.
//!
//! This module provides the CLI structure and command handlers for the
//! `parklot` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{CarCommand, ConfigCommand, ListArgs, LotCommand, OutputFormat, ServeCommand};

use crate::logging::Verbosity;

/// parklot - Track cars entering and leaving parking lots
///
/// Registers lots, checks cars in with an entry photo, checks them out by
/// unique code or plate, and serves the same operations over HTTP.
#[derive(Debug, Parser)]
#[command(name = "parklot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register and inspect parking lots
    #[command(subcommand)]
    Lot(LotCommand),

    /// Check cars in and out, list current cars and history
    #[command(subcommand)]
    Car(CarCommand),

    /// Run the HTTP server
    Serve(ServeCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Serve(ServeCommand { bind: None }),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "parklot");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_lot_register() {
        let cli = Cli::try_parse_from([
            "parklot",
            "lot",
            "register",
            "--name",
            "Main St",
            "--time-zone",
            "UTC",
        ])
        .unwrap();
        match cli.command {
            Command::Lot(LotCommand::Register {
                name,
                time_zone,
                json,
            }) => {
                assert_eq!(name, "Main St");
                assert_eq!(time_zone, "UTC");
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_lot_register_requires_name() {
        assert!(Cli::try_parse_from(["parklot", "lot", "register", "--time-zone", "UTC"]).is_err());
    }

    #[test]
    fn test_parse_car_add() {
        let cli = Cli::try_parse_from([
            "parklot", "car", "add", "-l", "lot-1", "-p", "ABC123", "-i", "photo.jpg", "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Car(CarCommand::Add {
                lot,
                plate,
                image,
                json,
            }) => {
                assert_eq!(lot, "lot-1");
                assert_eq!(plate, "ABC123");
                assert_eq!(image, PathBuf::from("photo.jpg"));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_car_remove() {
        let cli = Cli::try_parse_from(["parklot", "car", "remove", "--lot", "lot-1", "ABC123"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Car(CarCommand::Remove { ref identifier, .. }) if identifier == "ABC123"
        ));
    }

    #[test]
    fn test_parse_car_list_format() {
        let cli = Cli::try_parse_from(["parklot", "car", "list", "--lot", "x", "-f", "json"])
            .unwrap();
        match cli.command {
            Command::Car(CarCommand::List(args)) => {
                assert_eq!(args.lot, "x");
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["parklot", "car", "history", "--lot", "x"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Car(CarCommand::History(ListArgs {
                format: OutputFormat::Table,
                ..
            }))
        ));
    }

    #[test]
    fn test_parse_serve_bind() {
        let cli = Cli::try_parse_from(["parklot", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Command::Serve(cmd) => assert_eq!(cmd.bind.as_deref(), Some("0.0.0.0:9000")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_validate_file() {
        let cli = Cli::try_parse_from(["parklot", "config", "validate", "/tmp/c.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["parklot", "config", "path", "-c", "/custom/config.toml", "-vv"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(["parklot", "-q", "config", "path"]).unwrap();
        assert!(cli.quiet);
    }
}
