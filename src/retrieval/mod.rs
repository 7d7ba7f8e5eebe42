//! Hybrid Retriever: BM25 and dense search fused into one ranked list.
//!
//! A search runs in up to four stages:
//!
//! 1. lexical top-`lexical_k` from the store's [`LexicalIndex`](crate::corpus::LexicalIndex);
//! 2. dense top-`dense_k`, only when the store has vectors and an embedder is
//!    attached;
//! 3. fusion by [`FusionPolicy`], truncated to `candidate_pool`;
//! 4. an optional rerank of that pool by a [`Reranker`](crate::embedding::Reranker).
//!
//! The result is cut to `top_k`. Every degradation (no vectors, embedder or
//! reranker failure) falls back to the previous stage's ordering.

mod error;
pub mod fusion;
mod retriever;
mod types;


pub use error::{RetrievalError, RetrievalResult};
pub use fusion::{FusedHit, fuse, rrf_contribution};
pub use retriever::HybridRetriever;
pub use types::{EvidenceResult, FusionPolicy, SearchParams};
