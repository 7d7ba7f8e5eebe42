//! Turngate library crate (used by the CLI and integration tests).
//!
//! Generated dialogue turns go through two passes:
//!
//! 1. **Audit**: each turn is split into claims, evidence for every claim is
//!    pulled from a chunked corpus by [`HybridRetriever`] (BM25 + optional dense
//!    stage, fused, optionally reranked) and an NLI scorer assigns a
//!    [`Verdict`]. The result is an [`AuditRecord`].
//! 2. **Gate**: [`QualityGate`] compares turn metrics against
//!    [`GateThresholds`], retries a failing turn once, and routes it to
//!    `accepted/` or `rejected/` + `review/`.
//!
//! # Public API Surface
//!
//! ## Corpus & Retrieval
//! - [`IndexStore`], [`Chunk`], [`LexicalIndex`], [`DenseIndex`] - Index Store
//! - [`HybridRetriever`], [`SearchParams`], [`FusionPolicy`], [`EvidenceResult`]
//!
//! ## Claims, Verdicts & Audits
//! - [`ClaimExtractor`], [`SentenceClaimExtractor`], [`Claim`]
//! - [`VerdictAggregator`], [`VerdictRecord`]
//! - [`AuditBuilder`], [`AuditRecord`]
//!
//! ## Gate & Batches
//! - [`QualityGate`], [`GateConfig`], [`GateDecision`], [`RunSummary`]
//! - [`BatchRunner`], [`BatchLayout`], [`Turn`]
//!
//! ## Scorers
//! - [`Embedder`], [`EntailmentScorer`], [`Reranker`], [`ScorerContext`]
//! - Deterministic stand-ins in [`embedding::stub`]
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod audit;
pub mod batch;
pub mod claims;
pub mod config;
pub mod constants;
pub mod corpus;
pub mod embedding;
pub mod gate;
pub mod hashing;
pub mod retrieval;
pub mod storage;
pub mod verdict;

pub use audit::{AuditBuilder, AuditConfig, AuditError, AuditRecord};
pub use batch::{AuditReport, BatchError, BatchLayout, BatchRunner, Citation, Turn};
pub use claims::{Claim, ClaimError, ClaimExtractor, SentenceClaimExtractor};
pub use config::{Config, ConfigError};
pub use corpus::{Chunk, ChunkingConfig, DenseIndex, IndexError, IndexStore, LexicalIndex, SourceText};
pub use embedding::{
    Embedder, EmbeddingError, EntailmentScorer, NliScores, Reranker, ScorerContext, ScoringError,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::mock::{MockEmbedder, MockEntailmentScorer, MockReranker};
pub use gate::{
    GateConfig, GateDecision, GateError, GateState, GateThresholds, QualityGate, RetryStrategy,
    RunSummary, TurnMetrics,
};
pub use retrieval::{EvidenceResult, FusionPolicy, HybridRetriever, RetrievalError, SearchParams};
pub use storage::StorageError;
pub use verdict::{Verdict, VerdictAggregator, VerdictRecord};
