use thiserror::Error;

/// Failures reported by an [`Embedder`](super::Embedder) backend.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedder returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("invalid embedder configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Failures reported by an [`EntailmentScorer`](super::EntailmentScorer) backend.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("entailment backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("entailment inference failed: {reason}")]
    InferenceFailed { reason: String },
}

/// Failures reported by a [`Reranker`](super::Reranker) backend.
#[derive(Debug, Error)]
pub enum RerankerError {
    #[error("reranker inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("reranker returned {actual} scores for {expected} candidates")]
    ScoreCountMismatch { expected: usize, actual: usize },
}
