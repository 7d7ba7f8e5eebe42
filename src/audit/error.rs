use std::path::PathBuf;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit file {path} does not belong to turn '{expected}' (found '{actual}')")]
    TurnMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuditError {
    /// `true` when the audit file could not be read, did not parse, or
    /// belongs to another turn.
    pub fn is_skippable(&self) -> bool {
        match self {
            AuditError::Storage(e) => e.is_read_failure(),
            AuditError::TurnMismatch { .. } => true,
        }
    }
}

pub type AuditResult<T> = Result<T, AuditError>;
