//! Index Store: chunked corpus plus lexical and dense indices.
//!
//! - [`chunking`] cuts source texts into [`Chunk`]s (token or character windows).
//! - [`LexicalIndex`] scores chunks with BM25 over [`tokenize`]d text.
//! - [`DenseIndex`] holds one normalized vector per chunk, when an embedder is
//!   available at build time.
//! - [`IndexStore`] owns all three, position-aligned, and persists them with
//!   checksummed metadata ([`IndexMeta`]).

pub mod chunking;
mod dense;
mod error;
mod lexical;
mod meta;
mod model;
pub mod sources;
mod store;
mod tokenize;


pub use chunking::{ChunkingConfig, chunk_chars, chunk_tokens};
pub use dense::DenseIndex;
pub use error::{ChunkingError, IndexError, IndexResult};
pub use lexical::LexicalIndex;
pub use meta::{DenseMeta, FileMeta, IndexMeta};
pub use model::{Chunk, SourceText};
pub use sources::{read_corpus_jsonl, read_text_sources};
pub use store::{CHUNKS_FILE, DENSE_FILE, IndexStore, LEXICAL_FILE, META_FILE};
pub use tokenize::tokenize;
