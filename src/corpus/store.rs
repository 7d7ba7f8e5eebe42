use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::chunking::ChunkingConfig;
use super::dense::DenseIndex;
use super::error::{IndexError, IndexResult};
use super::lexical::{LexicalIndex, LexicalSnapshot};
use super::meta::{DenseMeta, FileMeta, IndexMeta};
use super::model::{Chunk, SourceText};
use super::tokenize::tokenize;
use crate::constants::DENSE_INDEX_VERSION;
use crate::embedding::{Embedder, embed_checked};
use crate::hashing::checksum_hex;
use crate::storage::{self, StorageError};

const EMBED_BATCH: usize = 64;

pub const META_FILE: &str = "meta.json";
pub const CHUNKS_FILE: &str = "chunks.json";
pub const LEXICAL_FILE: &str = "lexical.json";
pub const DENSE_FILE: &str = "dense.f16";

/// Chunked corpus with a lexical index and an optional dense index.
///
/// Both indices are position-aligned with [`chunks`](Self::chunks). The store
/// is read-only once built; share it behind an `Arc` for the whole batch.
#[derive(Debug, Clone)]
pub struct IndexStore {
    chunks: Vec<Arc<Chunk>>,
    lexical: LexicalIndex,
    dense: Option<DenseIndex>,
    encoder: Option<String>,
    built_at: DateTime<Utc>,
}

impl IndexStore {
    /// Chunks `sources` and indexes the result.
    ///
    /// The dense index is attempted only when `embedder` is given; if
    /// embedding fails the store is still built, lexical-only.
    pub fn build(
        sources: &[SourceText],
        chunking: &ChunkingConfig,
        embedder: Option<&dyn Embedder>,
    ) -> IndexResult<Self> {
        chunking.validate()?;

        let mut chunks = Vec::new();
        for source in sources {
            for (ordinal, text) in chunking.split(&source.text)?.into_iter().enumerate() {
                if text.trim().is_empty() {
                    continue;
                }
                chunks.push(Chunk::new(source.source_ref.clone(), ordinal as u32, text));
            }
        }

        debug!(
            sources = sources.len(),
            chunks = chunks.len(),
            "Chunked corpus"
        );

        Self::from_chunks(chunks, embedder)
    }

    /// Indexes prebuilt chunks as-is.
    pub fn from_chunks(chunks: Vec<Chunk>, embedder: Option<&dyn Embedder>) -> IndexResult<Self> {
        if chunks.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let lexical = LexicalIndex::build(&texts);

        let dense = embedder.and_then(|e| embed_chunks(e, &texts));
        let encoder = dense
            .as_ref()
            .and(embedder)
            .map(|e| e.name().to_string());

        info!(
            num_chunks = chunks.len(),
            has_dense = dense.is_some(),
            "Index store built"
        );

        Ok(Self {
            chunks: chunks.into_iter().map(Arc::new).collect(),
            lexical,
            dense,
            encoder,
            built_at: Utc::now(),
        })
    }

    /// Capability flag: `false` means retrieval runs lexical-only.
    pub fn has_dense(&self) -> bool {
        self.dense.is_some()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Arc<Chunk>] {
        &self.chunks
    }

    pub fn chunk(&self, position: usize) -> Option<&Arc<Chunk>> {
        self.chunks.get(position)
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn dense(&self) -> Option<&DenseIndex> {
        self.dense.as_ref()
    }

    pub fn encoder(&self) -> Option<&str> {
        self.encoder.as_deref()
    }

    /// Writes `chunks.json`, `lexical.json`, `dense.f16` (if any) and
    /// `meta.json` into `dir`.
    pub fn save(&self, dir: &Path) -> IndexResult<IndexMeta> {
        storage::ensure_dir(dir)?;

        let chunk_values: Vec<&Chunk> = self.chunks.iter().map(Arc::as_ref).collect();
        let chunks_bytes = encode_json(&dir.join(CHUNKS_FILE), &chunk_values)?;
        storage::write_atomic(&dir.join(CHUNKS_FILE), &chunks_bytes)?;

        let token_docs: Vec<Vec<String>> = self.chunks.iter().map(|c| tokenize(&c.text)).collect();
        let snapshot = self.lexical.snapshot(token_docs);
        let lexical_bytes = encode_json(&dir.join(LEXICAL_FILE), &snapshot)?;
        storage::write_atomic(&dir.join(LEXICAL_FILE), &lexical_bytes)?;

        let dense_meta = match &self.dense {
            Some(dense) => {
                let bytes = dense.to_f16_bytes();
                storage::write_atomic(&dir.join(DENSE_FILE), &bytes)?;
                Some(DenseMeta {
                    count: dense.len(),
                    checksum: checksum_hex(&bytes),
                    version: DENSE_INDEX_VERSION.to_string(),
                })
            }
            None => {
                storage::remove_if_exists(&dir.join(DENSE_FILE))?;
                None
            }
        };

        let meta = IndexMeta {
            encoder: self.encoder.clone(),
            built_at: self.built_at,
            vector_dim: self.dense.as_ref().map(DenseIndex::dim),
            num_chunks: self.chunks.len(),
            chunks: FileMeta {
                count: self.chunks.len(),
                checksum: checksum_hex(&chunks_bytes),
            },
            lexical: FileMeta {
                count: self.lexical.len(),
                checksum: checksum_hex(&lexical_bytes),
            },
            dense: dense_meta,
        };
        storage::write_json_atomic(&dir.join(META_FILE), &meta)?;

        info!(dir = %dir.display(), num_chunks = meta.num_chunks, "Index saved");
        Ok(meta)
    }

    /// Loads an index written by [`save`](Self::save), verifying checksums.
    pub fn load(dir: &Path) -> IndexResult<Self> {
        let meta_path = dir.join(META_FILE);
        if !meta_path.is_file() {
            return Err(IndexError::MissingIndex {
                path: dir.to_path_buf(),
            });
        }
        let meta: IndexMeta = storage::read_json(&meta_path)?;

        let chunks_path = dir.join(CHUNKS_FILE);
        let chunks_bytes = read_verified(&chunks_path, &meta.chunks.checksum)?;
        let chunks: Vec<Chunk> = decode_json(&chunks_path, &chunks_bytes)?;

        let lexical_path = dir.join(LEXICAL_FILE);
        let lexical_bytes = read_verified(&lexical_path, &meta.lexical.checksum)?;
        let snapshot: LexicalSnapshot = decode_json(&lexical_path, &lexical_bytes)?;

        if chunks.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        if snapshot.docs.len() != chunks.len() {
            return Err(IndexError::Corrupt {
                path: lexical_path,
                reason: format!(
                    "{} token lists for {} chunks",
                    snapshot.docs.len(),
                    chunks.len()
                ),
            });
        }
        let lexical = LexicalIndex::from_tokens(snapshot.docs, snapshot.k1, snapshot.b);

        let dense = match (&meta.dense, meta.vector_dim) {
            (Some(dense_meta), Some(dim)) => {
                let dense_path = dir.join(DENSE_FILE);
                let bytes = read_verified(&dense_path, &dense_meta.checksum)?;
                let index = DenseIndex::from_f16_bytes(dim, dense_meta.count, &bytes)
                    .filter(|d| d.len() == chunks.len())
                    .ok_or_else(|| IndexError::Corrupt {
                        path: dense_path.clone(),
                        reason: format!(
                            "expected {} vectors of dim {dim}",
                            chunks.len()
                        ),
                    })?;
                Some(index)
            }
            _ => None,
        };

        info!(
            dir = %dir.display(),
            num_chunks = chunks.len(),
            has_dense = dense.is_some(),
            "Index loaded"
        );

        Ok(Self {
            chunks: chunks.into_iter().map(Arc::new).collect(),
            lexical,
            dense,
            encoder: meta.encoder,
            built_at: meta.built_at,
        })
    }
}

fn embed_chunks(embedder: &dyn Embedder, texts: &[&str]) -> Option<DenseIndex> {
    let mut vectors = Vec::with_capacity(texts.len());
    for batch in texts.chunks(EMBED_BATCH) {
        match embed_checked(embedder, batch) {
            Ok(v) => vectors.extend(v),
            Err(e) => {
                warn!(error = %e, "Embedding failed; dense index disabled");
                return None;
            }
        }
    }

    let dense = DenseIndex::new(embedder.dim(), vectors);
    if dense.is_none() {
        warn!(dim = embedder.dim(), "Embedder reports zero dimension; dense index disabled");
    }
    dense
}

fn encode_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> IndexResult<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| {
        IndexError::Storage(StorageError::Encode {
            path: path.to_path_buf(),
            source: e,
        })
    })
}

fn decode_json<T: for<'de> Deserialize<'de>>(path: &Path, bytes: &[u8]) -> IndexResult<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        IndexError::Storage(StorageError::Decode {
            path: path.to_path_buf(),
            source: e,
        })
    })
}

fn read_verified(path: &Path, expected: &str) -> IndexResult<Vec<u8>> {
    let bytes = fs::read(path).map_err(|e| StorageError::io(path, e))?;
    let actual = checksum_hex(&bytes);
    if actual != expected {
        return Err(IndexError::StaleIndex {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(bytes)
}
