use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    /// `search` was called before an index store was attached.
    #[error("retriever has no index store attached")]
    NotInitialized,

    #[error("unknown fusion policy '{value}' (expected 'rrf' or 'normalized_sum')")]
    UnknownFusionPolicy { value: String },
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;
