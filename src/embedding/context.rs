use std::sync::Arc;

use super::{Embedder, EntailmentScorer, Reranker};

/// Which scorer backends are present for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub dense: bool,
    pub entailment: bool,
    pub rerank: bool,
}

/// Scorer backends shared by one batch.
///
/// Created once at batch start and cloned (cheaply, via `Arc`) into the index
/// builder, the retriever and the verdict aggregator.
#[derive(Clone, Default)]
pub struct ScorerContext {
    embedder: Option<Arc<dyn Embedder>>,
    entailment: Option<Arc<dyn EntailmentScorer>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl std::fmt::Debug for ScorerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScorerContext")
            .field("capabilities", &self.capabilities())
            .field("embedder", &self.embedder.as_ref().map(|e| e.name().to_string()))
            .finish()
    }
}

impl ScorerContext {
    /// A context with no backends: lexical-only retrieval, `uncertain` verdicts.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_entailment(mut self, scorer: Arc<dyn EntailmentScorer>) -> Self {
        self.entailment = Some(scorer);
        self
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn embedder(&self) -> Option<&Arc<dyn Embedder>> {
        self.embedder.as_ref()
    }

    pub fn entailment(&self) -> Option<&Arc<dyn EntailmentScorer>> {
        self.entailment.as_ref()
    }

    pub fn reranker(&self) -> Option<&Arc<dyn Reranker>> {
        self.reranker.as_ref()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            dense: self.embedder.is_some(),
            entailment: self.entailment.is_some(),
            rerank: self.reranker.is_some(),
        }
    }
}
