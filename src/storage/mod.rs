//! Flat-file persistence helpers.
//!
//! Every artifact (index files, audits, gate decisions, summaries) is written
//! through [`write_atomic`]: bytes go to a temp file in the target directory
//! and are renamed into place, so readers never observe a partial file and a
//! re-run overwrites the previous artifact wholesale.

pub mod error;

pub use error::StorageError;

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Creates `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))
}

/// Writes `data` to `path` via temp file + rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| StorageError::io(parent, e))?;
    tmp.write_all(data).map_err(|e| StorageError::io(path, e))?;
    tmp.flush().map_err(|e| StorageError::io(path, e))?;
    tmp.persist(path).map_err(|e| StorageError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.error.to_string(),
    })?;
    Ok(())
}

/// Serializes `value` as pretty JSON and writes it atomically.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Encode {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_atomic(path, &json)
}

/// Reads and decodes a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let raw = fs::read(path).map_err(|e| StorageError::io(path, e))?;
    serde_json::from_slice(&raw).map_err(|e| StorageError::Decode {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Removes `path` if present. Returns whether a file was removed.
pub fn remove_if_exists(path: &Path) -> Result<bool, StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::io(path, e)),
    }
}
