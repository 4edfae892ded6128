//! Memory worker library exports.
//!
//! This crate provides the command worker binary for the encrypted memory
//! vector store.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `protocol`: JSON request/response bodies
//! - `dispatch`: Maps commands onto the store
//! - `commands`: Settings, logging, stdin/stdout and exit status handling

pub mod cli;
pub mod commands;
pub mod dispatch;
pub mod protocol;

pub use cli::{Cli, Commands};
pub use commands::{
    apply_overrides, diagnostic, execute, exit_status, init_logging, is_configuration_error,
    open_dispatcher, run, EXIT_CONFIGURATION, EXIT_FAILURE, EXIT_OK,
};
pub use dispatch::Dispatcher;
