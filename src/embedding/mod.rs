//! Scorer collaborators consumed by retrieval and verdict aggregation.
//!
//! The models themselves (sentence encoders, NLI classifiers, cross-encoders)
//! live outside this crate. They are reached only through three traits:
//!
//! - [`Embedder`]: `texts -> normalized vectors`, used by the dense index and
//!   the dense retrieval stage.
//! - [`EntailmentScorer`]: `(premise, hypothesis) -> NliScores`, used by
//!   [`crate::verdict`].
//! - [`Reranker`]: `(query, candidates) -> scores`, used by the optional
//!   rerank stage in [`crate::retrieval`].
//!
//! A [`ScorerContext`] bundles whichever backends are present. It is built once
//! per batch and handed to the index, the retriever and the audit builder;
//! absence of a backend is a capability, not an error.
//!
//! [`stub`] ships deterministic, dependency-free backends for dry runs.

mod context;
mod entailment;
mod error;
/// Test doubles with scripted outputs.
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod rerank;
/// Deterministic stand-ins for real models.
pub mod stub;


pub use context::{Capabilities, ScorerContext};
pub use entailment::{EntailmentScorer, NliScores};
pub use error::{EmbeddingError, RerankerError, ScoringError};
pub use rerank::{Reranker, rerank_checked};

/// Produces L2-normalized vectors for a batch of texts.
pub trait Embedder: Send + Sync {
    /// Output vector dimension.
    fn dim(&self) -> usize;

    /// Embeds `texts`, returning one vector per input in the same order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Identifier written into index metadata.
    fn name(&self) -> &str {
        "external"
    }
}

/// Calls [`Embedder::embed`] and checks the reply: one vector per input,
/// each of `embedder.dim()` components.
pub fn embed_checked(embedder: &dyn Embedder, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let vectors = embedder.embed(texts)?;
    if vectors.len() != texts.len() {
        return Err(EmbeddingError::CountMismatch {
            expected: texts.len(),
            actual: vectors.len(),
        });
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != embedder.dim()) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: embedder.dim(),
            actual: bad.len(),
        });
    }
    Ok(vectors)
}

/// Scales `vector` to unit length in place. Zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Inner product of two equal-length vectors; `0.0` on length mismatch.
#[inline]
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
