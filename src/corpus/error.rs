use std::path::PathBuf;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    #[error("invalid chunk window: size {size}, overlap {overlap} (need size > 0 and overlap < size)")]
    InvalidWindow { size: usize, overlap: usize },
}

#[derive(Debug, Error)]
pub enum IndexError {
    /// No indexable chunks were produced. Fatal at batch start.
    #[error("corpus produced no indexable chunks")]
    EmptyCorpus,

    #[error("corpus not found at {path}")]
    MissingCorpus { path: PathBuf },

    #[error("index not found at {path}")]
    MissingIndex { path: PathBuf },

    #[error("stale index file {path}: checksum {actual} does not match meta.json ({expected})")]
    StaleIndex {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("index file {path} is inconsistent: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error(transparent)]
    Chunking(#[from] ChunkingError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type IndexResult<T> = Result<T, IndexError>;
