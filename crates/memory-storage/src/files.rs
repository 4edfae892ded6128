//! Durable file replacement.
//!
//! A payload is first written to a temporary file in the target's directory
//! and fsynced ("staged"), then renamed over the target. Readers only ever
//! see the old file or the complete new one.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;

/// Fully written, fsynced payload waiting to replace its target.
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Write `bytes` next to `target` without touching `target` itself.
pub fn stage(target: &Path, bytes: &[u8]) -> Result<StagedFile, StorageError> {
    let dir = parent_dir(target);
    fs::create_dir_all(&dir)?;

    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;

    Ok(StagedFile {
        temp,
        target: target.to_path_buf(),
    })
}

impl StagedFile {
    /// Atomically move the staged payload over its target.
    pub fn commit(self) -> Result<(), StorageError> {
        let target = self.target;
        self.temp.persist(&target).map_err(|e| e.error)?;
        sync_dir(&parent_dir(&target))?;
        debug!(path = ?target, "Replaced store file");
        Ok(())
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), StorageError> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), StorageError> {
    Ok(())
}

/// Stage and commit in one step.
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    stage(target, bytes)?.commit()
}

/// Read a file, treating "does not exist" as `None`.
pub fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
