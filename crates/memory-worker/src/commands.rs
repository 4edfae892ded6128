//! Process-level plumbing for the worker.
//!
//! Loads layered settings, applies CLI overrides, installs logging on stderr,
//! opens the store and runs one command over stdin/stdout.

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use memory_crypto::{CryptoError, EncryptionKey};
use memory_storage::{StorageError, StoreConfig, VectorStore};
use memory_types::{MemoryError, Settings};
use secrecy::ExposeSecret;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::dispatch::Dispatcher;

/// Exit status for a successful command
pub const EXIT_OK: u8 = 0;
/// Exit status for any non-configuration failure
pub const EXIT_FAILURE: u8 = 1;
/// Exit status for configuration failures
pub const EXIT_CONFIGURATION: u8 = 2;

/// Apply CLI flags on top of loaded settings.
pub fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(path) = &cli.index_path {
        settings.index_path = path.clone();
    }
    if let Some(path) = &cli.meta_path {
        settings.meta_path = path.clone();
    }
    if let Some(dimension) = cli.dimension {
        settings.embed_dimension = dimension;
    }
    if let Some(level) = &cli.log_level {
        settings.log_level = level.clone();
    }
}

/// Install the stderr tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Resolve the key and open the store described by `settings`.
pub fn open_dispatcher(settings: &Settings) -> Result<Dispatcher> {
    settings.validate()?;
    let raw_key = settings
        .index_key
        .as_ref()
        .map(|k| k.expose_secret().to_string())
        .unwrap_or_default();
    let key = EncryptionKey::resolve(&raw_key).map_err(StorageError::from)?;

    let config = StoreConfig::new(
        settings.expanded_index_path(),
        settings.expanded_meta_path(),
        settings.embed_dimension,
    );
    debug!(
        index_path = ?config.index_path,
        meta_path = ?config.meta_path,
        dimension = config.dimension,
        "Opening store"
    );
    let store = VectorStore::new(config, &key)?;
    Ok(Dispatcher::new(store)?)
}

/// Run one command: read the body from `input` if the command takes one,
/// write the JSON response to `output`.
pub fn execute<R: Read, W: Write>(
    dispatcher: &Dispatcher,
    command: Commands,
    mut input: R,
    mut output: W,
) -> Result<()> {
    let mut body = String::new();
    if command.reads_body() {
        input
            .read_to_string(&mut body)
            .context("Failed to read request from stdin")?;
    }

    let response = dispatcher.handle(command, &body)?;
    serde_json::to_writer(&mut output, &response).context("Failed to write response")?;
    output.flush().context("Failed to flush response")?;
    Ok(())
}

/// Entry point used by the binary.
pub fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    apply_overrides(&mut settings, &cli);
    init_logging(&settings.log_level)?;

    let dispatcher = open_dispatcher(&settings)?;
    execute(&dispatcher, cli.command, io::stdin().lock(), io::stdout().lock())
}

/// True when any error in the chain is a configuration failure.
pub fn is_configuration_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if cause.downcast_ref::<MemoryError>().is_some() {
            return true;
        }
        if let Some(storage) = cause.downcast_ref::<StorageError>() {
            return storage.is_configuration();
        }
        matches!(
            cause.downcast_ref::<CryptoError>(),
            Some(CryptoError::InvalidKey(_))
        )
    })
}

/// Process exit status for a failed run.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    if is_configuration_error(err) {
        EXIT_CONFIGURATION
    } else {
        EXIT_FAILURE
    }
}

/// The single stderr diagnostic line for a failed run.
pub fn diagnostic(err: &anyhow::Error) -> String {
    if is_configuration_error(err) {
        format!("configuration_error: {:#}", err)
    } else {
        format!("worker_error: {:#}", err)
    }
}
