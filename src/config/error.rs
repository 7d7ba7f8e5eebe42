//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable or flag held a value that could not be used.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// No batch id was given by flag or `TURNGATE_BATCH_ID`.
    #[error("no batch id given (pass --batch or set TURNGATE_BATCH_ID)")]
    MissingBatchId,

    /// A gate thresholds file lacks a required key.
    ///
    /// Fatal at gate start: a silently defaulted threshold would change which
    /// turns are accepted.
    #[error("thresholds file {path} is missing required key '{key}'")]
    MissingThreshold { key: &'static str, path: PathBuf },

    /// Thresholds are present but contradictory (e.g. `min_words > max_words`).
    #[error("invalid thresholds: {reason}")]
    InvalidThreshold { reason: String },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
