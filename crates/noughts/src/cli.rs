//! Command-line interface for noughts.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Noughts - tic-tac-toe over a raw TCP protocol
#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Tic-tac-toe responder and initiator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (defaults apply if it does not exist)
    #[arg(long, global = true, default_value = "noughts.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the responder server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Connect to a responder and play
    Play {
        /// Responder host
        #[arg(long)]
        host: Option<String>,

        /// Responder port
        #[arg(short, long)]
        port: Option<u16>,

        /// Player name (prompted for when absent)
        #[arg(short, long)]
        name: Option<String>,

        /// Let the search play every move without prompting
        #[arg(long)]
        auto: bool,

        /// Games to play in automatic mode
        #[arg(long)]
        games: Option<u32>,
    },
}
