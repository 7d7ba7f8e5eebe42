use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Count and content hash of one serialized index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub count: usize,
    pub checksum: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseMeta {
    pub count: usize,
    pub checksum: String,
    pub version: String,
}

/// Contents of `indices/meta.json`.
///
/// Checksums are BLAKE3 digests of the files as written; a mismatch on load
/// means the index is stale and must be rebuilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Embedder name, or `null` for a lexical-only index.
    pub encoder: Option<String>,
    pub built_at: DateTime<Utc>,
    pub vector_dim: Option<usize>,
    pub num_chunks: usize,
    pub chunks: FileMeta,
    pub lexical: FileMeta,
    pub dense: Option<DenseMeta>,
}
