//! Memory Worker
//!
//! Runs one command against an encrypted vector store per invocation.
//!
//! # Usage
//!
//! ```bash
//! echo '{"text": "hello world"}' | memory-worker add
//! echo '{"query": "hello", "top_k": 3}' | memory-worker search
//! memory-worker rotate > export.json
//! memory-worker restore < export.json
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/memory-worker/config.toml)
//! 3. Environment variables (VECTOR_*)
//! 4. CLI flags
//!
//! # Exit status
//!
//! `0` on success, `2` for configuration failures, `1` for anything else.

use std::process::ExitCode;

use clap::Parser;

use memory_worker::{diagnostic, exit_status, run, Cli, EXIT_OK};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(err) => {
            eprintln!("{}", diagnostic(&err));
            ExitCode::from(exit_status(&err))
        }
    }
}
