use serde::{Deserialize, Serialize};

use crate::hashing::chunk_id;

/// Raw text to be chunked, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceText {
    pub source_ref: String,
    pub text: String,
}

impl SourceText {
    pub fn new(source_ref: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_ref: source_ref.into(),
            text: text.into(),
        }
    }
}

/// An indexed unit of corpus text. Immutable once indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Content-derived id (see [`chunk_id`]).
    pub id: String,
    pub text: String,
    pub source_ref: String,
    /// Position of this chunk within its source.
    pub ordinal: u32,
}

impl Chunk {
    pub fn new(source_ref: impl Into<String>, ordinal: u32, text: impl Into<String>) -> Self {
        let source_ref = source_ref.into();
        let text = text.into();
        Self {
            id: chunk_id(&source_ref, ordinal, &text),
            text,
            source_ref,
            ordinal,
        }
    }
}
