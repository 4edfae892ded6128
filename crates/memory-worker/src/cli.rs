//! CLI argument parsing for the memory worker.
//!
//! The subcommand selects the operation; its request body, when it has one,
//! is a JSON object on stdin. CLI flags override all other config sources.

use clap::{Parser, Subcommand};

/// Encrypted memory vector store worker
///
/// Runs one command against the store and writes one JSON response to stdout.
#[derive(Parser, Debug)]
#[command(name = "memory-worker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/memory-worker/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override encrypted index path
    #[arg(long, global = true)]
    pub index_path: Option<String>,

    /// Override encrypted metadata path
    #[arg(long, global = true)]
    pub meta_path: Option<String>,

    /// Override embedding dimension
    #[arg(short, long, global = true)]
    pub dimension: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Worker commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Embed text and store it ({"text": ...})
    Add,

    /// Remove vectors by id ({"vector_ids": [...]})
    Remove,

    /// Search for the closest stored vectors ({"query": ..., "top_k": 5})
    Search,

    /// Export the decrypted index and metadata for key rotation
    Rotate,

    /// Replace the store with a plaintext export ({"index": ..., "meta": {...}})
    Restore,

    /// Show store counters
    Stats,
}

impl Commands {
    /// Whether the command reads a JSON request body from stdin.
    pub fn reads_body(self) -> bool {
        !matches!(self, Commands::Rotate | Commands::Stats)
    }

    pub fn name(self) -> &'static str {
        match self {
            Commands::Add => "add",
            Commands::Remove => "remove",
            Commands::Search => "search",
            Commands::Rotate => "rotate",
            Commands::Restore => "restore",
            Commands::Stats => "stats",
        }
    }
}
