//! Atomic file operations for crash-safe snapshots.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{PersistenceError, Result};

/// Create a directory and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Writes data to a file atomically.
///
/// Data goes to a temporary file in the target directory which is then
/// renamed over the target, so readers never observe a partial file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    ensure_dir(dir)?;

    let write_err = |source| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    temp_file.write_all(data).map_err(write_err)?;
    temp_file.as_file().sync_all().map_err(write_err)?;
    temp_file.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Copy a file, creating the destination directory.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(from, to).map_err(|source| PersistenceError::WriteError {
        path: to.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Read and parse a JSON file into an untyped value.
pub fn read_json_value(path: &Path) -> Result<serde_json::Value> {
    let data = fs::read_to_string(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&data)?)
}
