//! Command-line interface for fiqscore.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// FIQScore - football tournament quiz
#[derive(Parser, Debug)]
#[command(name = "fiqscore")]
#[command(about = "Football tournament quiz with extra-time tie-breaks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the reference question endpoint
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8888")]
        port: u16,

        /// JSON question bank; the built-in sample questions otherwise
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// Play in the terminal
    Play {
        /// Game configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Question endpoint; overrides the config and `FIQSCORE_SUPPLY_URL`.
        /// Without one the built-in bank is used.
        #[arg(long)]
        supply_url: Option<String>,

        /// Play a single tournament
        #[arg(long, conflicts_with = "mix")]
        tournament: Option<String>,

        /// Mix two different tournaments
        #[arg(long, num_args = 2, value_names = ["FIRST", "SECOND"])]
        mix: Option<Vec<String>>,
    },
}
