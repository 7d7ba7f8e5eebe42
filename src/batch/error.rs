use std::path::PathBuf;
use thiserror::Error;

use crate::audit::AuditError;
use crate::config::ConfigError;
use crate::corpus::IndexError;
use crate::gate::GateError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("malformed turn file {path}: {reason}")]
    MalformedTurn { path: PathBuf, reason: String },

    #[error("generated turns directory not found: {path}")]
    MissingGenerated { path: PathBuf },

    #[error("audit task failed: {reason}")]
    Join { reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Gate(#[from] GateError),
}

impl BatchError {
    /// `true` for per-file problems that skip one turn instead of failing the batch.
    pub fn is_skippable(&self) -> bool {
        match self {
            BatchError::MalformedTurn { .. } => true,
            BatchError::Storage(e) => e.is_read_failure(),
            BatchError::Audit(e) => e.is_skippable(),
            _ => false,
        }
    }
}

pub type BatchResult<T> = Result<T, BatchError>;
