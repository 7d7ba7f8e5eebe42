use serde::{Deserialize, Serialize};

use super::error::ChunkingError;
use crate::constants::DEFAULT_CHUNK_WINDOW;

/// How source texts are cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ChunkingConfig {
    /// Windows of `window` whitespace tokens; consecutive windows share `overlap` tokens.
    Tokens { window: usize, overlap: usize },
    /// Windows of `max_chars` characters; consecutive windows share `overlap` characters.
    Chars { max_chars: usize, overlap: usize },
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        ChunkingConfig::Tokens {
            window: DEFAULT_CHUNK_WINDOW,
            overlap: 0,
        }
    }
}

impl ChunkingConfig {
    /// Token windows of `window` tokens, or the default window when `None`.
    pub fn tokens(window: Option<usize>, overlap: usize) -> Self {
        ChunkingConfig::Tokens {
            window: window.unwrap_or(DEFAULT_CHUNK_WINDOW),
            overlap,
        }
    }

    pub fn validate(&self) -> Result<(), ChunkingError> {
        let (size, overlap) = match *self {
            ChunkingConfig::Tokens { window, overlap } => (window, overlap),
            ChunkingConfig::Chars { max_chars, overlap } => (max_chars, overlap),
        };
        if size == 0 || overlap >= size {
            return Err(ChunkingError::InvalidWindow { size, overlap });
        }
        Ok(())
    }

    pub fn split(&self, text: &str) -> Result<Vec<String>, ChunkingError> {
        match *self {
            ChunkingConfig::Tokens { window, overlap } => chunk_tokens(text, window, overlap),
            ChunkingConfig::Chars { max_chars, overlap } => chunk_chars(text, max_chars, overlap),
        }
    }
}

/// Splits `text` into windows of `window` whitespace-separated tokens.
///
/// Tokens inside a chunk are re-joined with single spaces.
pub fn chunk_tokens(text: &str, window: usize, overlap: usize) -> Result<Vec<String>, ChunkingError> {
    if window == 0 || overlap >= window {
        return Err(ChunkingError::InvalidWindow {
            size: window,
            overlap,
        });
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();
    let step = window - overlap;
    let mut start = 0;
    while start < tokens.len() {
        let end = (start + window).min(tokens.len());
        chunks.push(tokens[start..end].join(" "));
        if end == tokens.len() {
            break;
        }
        start += step;
    }
    Ok(chunks)
}

/// Splits `text` into windows of at most `max_chars` characters.
///
/// Consecutive chunks share exactly `overlap` characters. Boundaries fall on
/// `char` boundaries, never inside a multi-byte sequence.
pub fn chunk_chars(text: &str, max_chars: usize, overlap: usize) -> Result<Vec<String>, ChunkingError> {
    if max_chars == 0 || overlap >= max_chars {
        return Err(ChunkingError::InvalidWindow {
            size: max_chars,
            overlap,
        });
    }

    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < n {
        let end = (start + max_chars).min(n);
        chunks.push(chars[start..end].iter().collect());
        if end == n {
            break;
        }
        start = end - overlap;
    }
    Ok(chunks)
}
