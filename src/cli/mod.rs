pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nuztap")]
#[command(about = "Ranked news feed refresh pipeline", long_about = None)]
pub struct Cli {
    /// Number of concurrent fetch workers (overrides the config file)
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Path to a config file (default: ~/.config/nuztap/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the config file)
    #[arg(long, env = "NUZTAP_DB", global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clear an owner's feed and refetch it with the external fetch program
    Refresh {
        /// Owner identifier
        owner: String,
        /// Access token for the provider
        token: String,
        /// Access secret for the provider
        secret: String,
    },
    /// Show an owner's feed, highest rank first
    Show {
        /// Owner identifier
        owner: String,
    },
    /// Read newline-delimited JSON records from stdin into an owner's feed
    Ingest {
        /// Owner identifier
        owner: String,
    },
    /// Delete every item in an owner's feed
    Clear {
        /// Owner identifier
        owner: String,
    },
}
