use super::error::RerankerError;

/// Pairwise (query, candidate) relevance scorer.
pub trait Reranker: Send + Sync {
    /// Returns one score per candidate, aligned with `candidates`. Higher is
    /// more relevant.
    fn rerank(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>, RerankerError>;
}

/// Calls [`Reranker::rerank`] and checks that one score came back per candidate.
pub fn rerank_checked(
    reranker: &dyn Reranker,
    query: &str,
    candidates: &[&str],
) -> Result<Vec<f32>, RerankerError> {
    let scores = reranker.rerank(query, candidates)?;
    if scores.len() != candidates.len() {
        return Err(RerankerError::ScoreCountMismatch {
            expected: candidates.len(),
            actual: scores.len(),
        });
    }
    Ok(scores)
}
