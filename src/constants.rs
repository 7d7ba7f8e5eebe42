//! Cross-cutting, shared constants.
//!
//! Retrieval and audit defaults live here so the CLI, the config layer and the
//! library types agree on them. Prefer passing explicit values through
//! [`SearchParams`](crate::retrieval::SearchParams) over reading these directly.

/// Smoothing constant for reciprocal rank fusion.
pub const RRF_K: f64 = 60.0;

/// Chunks taken from the lexical stage before fusion.
pub const DEFAULT_LEXICAL_K: usize = 50;

/// Chunks taken from the dense stage before fusion.
pub const DEFAULT_DENSE_K: usize = 50;

/// Size of the fused candidate pool handed to the reranker.
pub const DEFAULT_CANDIDATE_POOL: usize = 50;

/// Final number of results returned by a search.
pub const DEFAULT_TOP_K: usize = 10;

/// Evidence items retrieved per claim during an audit.
pub const DEFAULT_EVIDENCE_PER_CLAIM: usize = 6;

/// BM25 term-frequency saturation.
pub const BM25_K1: f32 = 1.5;

/// BM25 document-length normalization.
pub const BM25_B: f32 = 0.75;

/// Default token window for corpus chunking.
pub const DEFAULT_CHUNK_WINDOW: usize = 160;

/// Default dimension of the hashing stub embedder.
pub const DEFAULT_STUB_EMBEDDING_DIM: usize = 256;

/// Version tag written into `meta.json` for the dense index file format.
pub const DENSE_INDEX_VERSION: &str = "f16-le-v1";

/// Capacity of the query-embedding cache used by the retriever.
pub const DEFAULT_QUERY_CACHE_CAPACITY: u64 = 4_096;
