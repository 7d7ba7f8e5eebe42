//! Deterministic backends that need no model files.
//!
//! These exist so a batch can be dry-run end to end. Their scores are lexical
//! heuristics and say nothing about meaning.

use std::collections::HashSet;

use tracing::debug;

use super::error::{EmbeddingError, RerankerError, ScoringError};
use super::{Embedder, EntailmentScorer, NliScores, Reranker, normalize};
use crate::constants::DEFAULT_STUB_EMBEDDING_DIM;
use crate::corpus::tokenize;
use crate::hashing::hash_to_u64;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "and", "but",
    "if", "or", "because", "what", "which", "who", "this", "that", "these", "those", "it", "its",
    "est", "et", "sed", "ad", "ut", "cum", "quod", "qui", "quae",
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nor", "non", "nec", "neque", "nihil", "nullus", "numquam",
];

fn content_words(text: &str) -> HashSet<String> {
    tokenize(text)
        .into_iter()
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

fn is_negated(text: &str) -> bool {
    tokenize(text)
        .iter()
        .any(|w| NEGATIONS.contains(&w.as_str()))
}

/// Feature-hashing embedder: each token increments one of `dim` buckets.
///
/// Texts sharing vocabulary land close together under inner product, which is
/// enough to exercise the dense stage without a model.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_STUB_EMBEDDING_DIM,
        }
    }
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Result<Self, EmbeddingError> {
        if dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "dim must be greater than zero".to_string(),
            });
        }
        Ok(Self { dim })
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        for token in tokenize(text) {
            let h = hash_to_u64(token.as_bytes());
            let bucket = (h % self.dim as u64) as usize;
            // High bit picks the sign so unrelated tokens partially cancel.
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        debug!(count = texts.len(), dim = self.dim, "Generating stub embeddings");
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn name(&self) -> &str {
        "stub/hashing"
    }
}

/// Reranker scoring recall and Jaccard overlap of content words, squashed
/// through a sigmoid into `[0, 1]`.
#[derive(Debug, Clone, Default)]
pub struct OverlapReranker;

impl OverlapReranker {
    pub fn score(&self, query: &str, candidate: &str) -> f32 {
        let query_words = content_words(query);
        let candidate_words = content_words(candidate);

        if query_words.is_empty() {
            let len_ratio = (query.len().min(candidate.len()) as f32)
                / (query.len().max(candidate.len()).max(1) as f32);
            return len_ratio * 0.3;
        }

        let matches = query_words.intersection(&candidate_words).count();
        let recall = matches as f32 / query_words.len() as f32;

        let union = query_words.union(&candidate_words).count();
        let jaccard = if union > 0 {
            matches as f32 / union as f32
        } else {
            0.0
        };

        let base_score = 0.6 * recall + 0.4 * jaccard;
        let normalized = 1.0 / (1.0 + (-8.0 * (base_score - 0.5)).exp());
        normalized.clamp(0.0, 1.0)
    }
}

impl Reranker for OverlapReranker {
    fn rerank(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>, RerankerError> {
        Ok(candidates.iter().map(|c| self.score(query, c)).collect())
    }
}

/// Entailment heuristic: claim-word recall in the premise, with a polarity
/// check on negation words.
///
/// Full recall with matching polarity reads as entailment; full recall with
/// mismatched polarity reads as contradiction.
#[derive(Debug, Clone, Default)]
pub struct OverlapEntailmentScorer;

impl EntailmentScorer for OverlapEntailmentScorer {
    fn classify(&self, premise: &str, hypothesis: &str) -> Result<NliScores, ScoringError> {
        let hypothesis_words = content_words(hypothesis);
        if hypothesis_words.is_empty() {
            return Ok(NliScores::new(0.0, 0.0, 1.0));
        }
        let premise_words = content_words(premise);
        let recall = hypothesis_words.intersection(&premise_words).count() as f32
            / hypothesis_words.len() as f32;

        let scores = if is_negated(premise) != is_negated(hypothesis) {
            NliScores::new(recall * 0.5, recall, 1.0 - recall)
        } else {
            NliScores::new(recall, 0.0, 1.0 - recall)
        };
        Ok(scores.clamped())
    }
}
