use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("claim extraction failed: {reason}")]
    ExtractionFailed { reason: String },

    #[error("claim classifier failed: {reason}")]
    ClassifierFailed { reason: String },
}
