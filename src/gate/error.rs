use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum GateError {
    /// The retry collaborator could not produce a revised turn.
    #[error("retry failed: {reason}")]
    RetryFailed { reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type GateResult<T> = Result<T, GateError>;
