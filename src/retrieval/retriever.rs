use std::sync::Arc;

use moka::sync::Cache;
use tracing::{debug, warn};

use super::error::{RetrievalError, RetrievalResult};
use super::fusion::{FusedHit, fuse};
use super::types::{EvidenceResult, FusionPolicy, SearchParams};
use crate::constants::DEFAULT_QUERY_CACHE_CAPACITY;
use crate::corpus::IndexStore;
use crate::embedding::{ScorerContext, embed_checked, normalize, rerank_checked};
use crate::hashing::hash_query;

/// Lexical + dense retriever over a shared [`IndexStore`].
///
/// Read-only after construction; share it behind an `Arc` across audit tasks.
pub struct HybridRetriever {
    store: Option<Arc<IndexStore>>,
    scorers: ScorerContext,
    fusion: FusionPolicy,
    query_cache: Cache<[u8; 32], Arc<Vec<f32>>>,
}

impl std::fmt::Debug for HybridRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridRetriever")
            .field("num_chunks", &self.store.as_ref().map(|s| s.len()))
            .field("dense_enabled", &self.dense_enabled())
            .field("fusion", &self.fusion)
            .field("scorers", &self.scorers)
            .finish()
    }
}

impl HybridRetriever {
    pub fn new(store: Arc<IndexStore>, scorers: ScorerContext) -> Self {
        Self {
            store: Some(store),
            ..Self::uninitialized(scorers)
        }
    }

    /// A retriever with no store; every search fails with
    /// [`RetrievalError::NotInitialized`] until [`attach`](Self::attach).
    pub fn uninitialized(scorers: ScorerContext) -> Self {
        Self {
            store: None,
            scorers,
            fusion: FusionPolicy::default(),
            query_cache: Cache::builder()
                .max_capacity(DEFAULT_QUERY_CACHE_CAPACITY)
                .build(),
        }
    }

    pub fn with_fusion(mut self, fusion: FusionPolicy) -> Self {
        self.fusion = fusion;
        self
    }

    pub fn attach(&mut self, store: Arc<IndexStore>) {
        self.store = Some(store);
        self.query_cache.invalidate_all();
    }

    pub fn store(&self) -> Option<&Arc<IndexStore>> {
        self.store.as_ref()
    }

    pub fn fusion(&self) -> FusionPolicy {
        self.fusion
    }

    pub fn scorers(&self) -> &ScorerContext {
        &self.scorers
    }

    /// Whether searches will run the dense stage.
    pub fn dense_enabled(&self) -> bool {
        match (&self.store, self.scorers.embedder()) {
            (Some(store), Some(embedder)) => store
                .dense()
                .is_some_and(|d| d.dim() == embedder.dim()),
            _ => false,
        }
    }

    /// Ranked evidence for `query`, at most `params.top_k` items.
    pub fn search(&self, query: &str, params: &SearchParams) -> RetrievalResult<Vec<EvidenceResult>> {
        let store = self.store.as_ref().ok_or(RetrievalError::NotInitialized)?;
        if params.top_k == 0 {
            return Ok(Vec::new());
        }

        let lexical = store.lexical().top_k(query, params.lexical_k);
        let dense = self.dense_stage(store, query, params.dense_k);

        let mut fused = fuse(self.fusion, &lexical, &dense);
        fused.truncate(params.candidate_pool);

        let mut results: Vec<EvidenceResult> = fused
            .into_iter()
            .filter_map(|hit| to_evidence(store, hit))
            .collect();

        if params.rerank {
            self.rerank(query, &mut results);
        }
        results.truncate(params.top_k);

        debug!(
            query_len = query.len(),
            lexical_hits = lexical.len(),
            dense_hits = dense.len(),
            returned = results.len(),
            fusion = %self.fusion,
            "Search complete"
        );

        Ok(results)
    }

    fn dense_stage(&self, store: &IndexStore, query: &str, k: usize) -> Vec<(usize, f32)> {
        if k == 0 || !self.dense_enabled() {
            return Vec::new();
        }
        let Some(index) = store.dense() else {
            return Vec::new();
        };
        match self.query_embedding(query) {
            Some(vector) => index.top_k(&vector, k),
            None => Vec::new(),
        }
    }

    fn query_embedding(&self, query: &str) -> Option<Arc<Vec<f32>>> {
        let key = hash_query(query);
        if let Some(hit) = self.query_cache.get(&key) {
            return Some(hit);
        }

        let embedder = self.scorers.embedder()?;
        let mut vector = match embed_checked(embedder.as_ref(), &[query]) {
            Ok(mut vectors) => vectors.swap_remove(0),
            Err(e) => {
                warn!(error = %e, "Query embedding failed; dense stage skipped");
                return None;
            }
        };
        normalize(&mut vector);

        let vector = Arc::new(vector);
        self.query_cache.insert(key, Arc::clone(&vector));
        Some(vector)
    }

    fn rerank(&self, query: &str, results: &mut [EvidenceResult]) {
        let Some(reranker) = self.scorers.reranker() else {
            debug!("Rerank requested without a reranker; keeping fused order");
            return;
        };
        if results.is_empty() {
            return;
        }

        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        let scores = match rerank_checked(reranker.as_ref(), query, &texts) {
            Ok(scores) => scores,
            Err(e) => {
                warn!(error = %e, "Rerank failed; keeping fused order");
                return;
            }
        };

        for (result, score) in results.iter_mut().zip(scores) {
            result.rerank_score = Some(score);
        }
        // Stable: equal scores keep fused order. NaN sorts last.
        results.sort_by(|a, b| rerank_key(b).total_cmp(&rerank_key(a)));
    }
}

fn rerank_key(result: &EvidenceResult) -> f32 {
    match result.rerank_score {
        Some(score) if !score.is_nan() => score,
        _ => f32::NEG_INFINITY,
    }
}

fn to_evidence(store: &IndexStore, hit: FusedHit) -> Option<EvidenceResult> {
    let chunk = store.chunk(hit.position)?;
    Some(EvidenceResult {
        position: hit.position,
        chunk: Arc::clone(chunk),
        fused_score: hit.score,
        lexical_score: hit.lexical_score,
        dense_score: hit.dense_score,
        lexical_rank: hit.lexical_rank,
        dense_rank: hit.dense_rank,
        rerank_score: None,
    })
}
