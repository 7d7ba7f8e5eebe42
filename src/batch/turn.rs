use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::BatchError;
use crate::storage;

/// A source reference attached to a generated turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub work: String,
    #[serde(default, rename = "ref")]
    pub reference: String,
}

impl Citation {
    pub fn new(work: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            work: work.into(),
            reference: reference.into(),
        }
    }
}

/// A generated dialogue turn awaiting audit and gating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

/// Generated-turn file as written by upstream stages, which vary in shape.
#[derive(Debug, Deserialize)]
struct RawTurn {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    citations: Option<Vec<Citation>>,
    #[serde(default)]
    meta: Option<RawMeta>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    #[serde(default)]
    citations: Option<Vec<Citation>>,
}

impl Turn {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            citations: Vec::new(),
            source_path: None,
        }
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    /// Parses a generated-turn document.
    ///
    /// `id` falls back to `fallback_id`. The turn text is a non-empty
    /// `response` when present, else `text`. Citations are read from the
    /// top level, else from `meta.citations`.
    pub fn from_json(raw: &[u8], fallback_id: &str) -> Result<Self, serde_json::Error> {
        let raw: RawTurn = serde_json::from_slice(raw)?;
        let text = raw
            .response
            .filter(|t| !t.is_empty())
            .or(raw.text)
            .unwrap_or_default();
        let citations = raw
            .citations
            .or_else(|| raw.meta.and_then(|m| m.citations))
            .unwrap_or_default();

        Ok(Self {
            id: raw
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| fallback_id.to_string()),
            text,
            citations,
            source_path: None,
        })
    }

    /// Loads a turn file; the file stem is the fallback id.
    pub fn load(path: &Path) -> Result<Self, BatchError> {
        let bytes = std::fs::read(path).map_err(|e| storage::StorageError::io(path, e))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut turn = Self::from_json(&bytes, &stem).map_err(|e| BatchError::MalformedTurn {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        turn.source_path = Some(path.to_path_buf());
        Ok(turn)
    }
}
