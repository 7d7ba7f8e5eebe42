use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::RetrievalError;
use crate::constants::{
    DEFAULT_CANDIDATE_POOL, DEFAULT_DENSE_K, DEFAULT_LEXICAL_K, DEFAULT_TOP_K,
};
use crate::corpus::Chunk;

/// How lexical and dense rankings are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionPolicy {
    /// Reciprocal rank fusion, `Σ 1/(60 + rank)` over 1-based ranks.
    #[default]
    Rrf,
    /// Per-stage min-max normalization, then a plain sum.
    NormalizedSum,
}

impl FusionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FusionPolicy::Rrf => "rrf",
            FusionPolicy::NormalizedSum => "normalized_sum",
        }
    }
}

impl fmt::Display for FusionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FusionPolicy {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rrf" => Ok(FusionPolicy::Rrf),
            "normalized_sum" | "sum" => Ok(FusionPolicy::NormalizedSum),
            _ => Err(RetrievalError::UnknownFusionPolicy {
                value: s.to_string(),
            }),
        }
    }
}

/// Per-search knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub lexical_k: usize,
    pub dense_k: usize,
    /// Fused candidates kept before reranking.
    pub candidate_pool: usize,
    pub top_k: usize,
    pub rerank: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            lexical_k: DEFAULT_LEXICAL_K,
            dense_k: DEFAULT_DENSE_K,
            candidate_pool: DEFAULT_CANDIDATE_POOL,
            top_k: DEFAULT_TOP_K,
            rerank: false,
        }
    }
}

impl SearchParams {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_rerank(mut self, rerank: bool) -> Self {
        self.rerank = rerank;
        self
    }
}

/// One retrieved chunk with the scores that placed it.
#[derive(Debug, Clone)]
pub struct EvidenceResult {
    /// Chunk position in the index store.
    pub position: usize,
    pub chunk: Arc<Chunk>,
    pub fused_score: f64,
    pub lexical_score: Option<f32>,
    pub dense_score: Option<f32>,
    /// 1-based rank within the lexical stage.
    pub lexical_rank: Option<usize>,
    /// 1-based rank within the dense stage.
    pub dense_rank: Option<usize>,
    pub rerank_score: Option<f32>,
}

impl EvidenceResult {
    /// The score that ordered this result: the rerank score when present,
    /// otherwise the fused score.
    pub fn score(&self) -> f64 {
        self.rerank_score
            .map(f64::from)
            .unwrap_or(self.fused_score)
    }
}
