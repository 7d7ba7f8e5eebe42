//! Claim Extractor: turns a generated turn into individually checkable claims.
//!
//! [`SentenceClaimExtractor`] splits on sentence punctuation. An optional
//! [`ClaimClassifier`] can drop sentences that are not factual claims; when it
//! errors on a sentence, that sentence is kept.

mod error;
mod extractor;

#[cfg(test)]
mod tests;

pub use error::ClaimError;
pub use extractor::{Claim, ClaimClassifier, ClaimExtractor, SentenceClaimExtractor, split_sentences};
