use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::error::{EmbeddingError, RerankerError, ScoringError};
use super::{Embedder, EntailmentScorer, NliScores, Reranker, normalize};

/// Entailment scorer returning scripted scores keyed by premise text.
#[derive(Default)]
pub struct MockEntailmentScorer {
    by_premise: RwLock<HashMap<String, NliScores>>,
    failing: RwLock<Vec<String>>,
    fallback: NliScores,
    calls: AtomicUsize,
}

impl MockEntailmentScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores returned for premises without a scripted entry.
    pub fn with_fallback(mut self, scores: NliScores) -> Self {
        self.fallback = scores;
        self
    }

    pub fn set(&self, premise: &str, scores: NliScores) {
        self.by_premise.write().insert(premise.to_string(), scores);
    }

    /// Makes every call whose premise contains `needle` fail.
    pub fn fail_on(&self, needle: &str) {
        self.failing.write().push(needle.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl EntailmentScorer for MockEntailmentScorer {
    fn classify(&self, premise: &str, _hypothesis: &str) -> Result<NliScores, ScoringError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.failing.read().iter().any(|n| premise.contains(n.as_str())) {
            return Err(ScoringError::InferenceFailed {
                reason: "mock failure".to_string(),
            });
        }
        Ok(self
            .by_premise
            .read()
            .get(premise)
            .copied()
            .unwrap_or(self.fallback))
    }
}

/// Embedder returning fixed vectors keyed by exact text.
pub struct MockEmbedder {
    dim: usize,
    vectors: RwLock<HashMap<String, Vec<f32>>>,
    fail: bool,
}

impl MockEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: RwLock::new(HashMap::new()),
            fail: false,
        }
    }

    /// An embedder whose every call fails.
    pub fn failing(dim: usize) -> Self {
        Self {
            fail: true,
            ..Self::new(dim)
        }
    }

    pub fn set(&self, text: &str, mut vector: Vec<f32>) {
        normalize(&mut vector);
        self.vectors.write().insert(text.to_string(), vector);
    }
}

impl Embedder for MockEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if self.fail {
            return Err(EmbeddingError::Unavailable {
                reason: "mock embedder configured to fail".to_string(),
            });
        }
        let vectors = self.vectors.read();
        Ok(texts
            .iter()
            .map(|t| vectors.get(*t).cloned().unwrap_or_else(|| vec![0.0; self.dim]))
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Reranker returning scripted scores keyed by candidate text.
#[derive(Default)]
pub struct MockReranker {
    scores: RwLock<HashMap<String, f32>>,
    fail: bool,
}

impl MockReranker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn set(&self, candidate: &str, score: f32) {
        self.scores.write().insert(candidate.to_string(), score);
    }
}

impl Reranker for MockReranker {
    fn rerank(&self, _query: &str, candidates: &[&str]) -> Result<Vec<f32>, RerankerError> {
        if self.fail {
            return Err(RerankerError::InferenceFailed {
                reason: "mock reranker configured to fail".to_string(),
            });
        }
        let scores = self.scores.read();
        Ok(candidates
            .iter()
            .map(|c| scores.get(*c).copied().unwrap_or(0.0))
            .collect())
    }
}
