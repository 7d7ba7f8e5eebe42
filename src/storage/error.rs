use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("write failed for {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` when the underlying cause is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// `true` when the file was read but its content did not parse.
    pub fn is_malformed(&self) -> bool {
        matches!(self, StorageError::Decode { .. })
    }

    /// `true` when reading or decoding a single file failed, whatever the cause.
    pub fn is_read_failure(&self) -> bool {
        matches!(self, StorageError::Io { .. } | StorageError::Decode { .. })
    }
}
