//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Parking lot commands.
#[derive(Debug, Subcommand)]
pub enum LotCommand {
    /// Register a new parking lot
    Register {
        /// Display name of the lot
        #[arg(short, long)]
        name: String,

        /// Time zone identifier (e.g. "Europe/Paris")
        #[arg(short, long)]
        time_zone: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show a registered lot
    Show {
        /// Lot id returned by `lot register`
        lot_id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Car commands.
#[derive(Debug, Subcommand)]
pub enum CarCommand {
    /// Check a car into a lot
    Add {
        /// Lot to check into
        #[arg(short, long)]
        lot: String,

        /// Licence plate
        #[arg(short, long)]
        plate: String,

        /// Entry photo file
        #[arg(short, long, value_name = "FILE")]
        image: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Check a car out of a lot
    Remove {
        /// Lot to check out of
        #[arg(short, long)]
        lot: String,

        /// Unique code or licence plate
        identifier: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List cars currently parked
    List(ListArgs),

    /// List cars that have left
    History(ListArgs),
}

/// Arguments shared by the listing commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Lot to list
    #[arg(short, long)]
    pub lot: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        file: Option<PathBuf>,
    },
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
