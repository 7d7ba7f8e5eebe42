use std::sync::Arc;

use parking_lot::RwLock;

use super::metrics::{TokenSet, jaccard};

/// Token sets of every text accepted so far in the batch.
///
/// Entries are inserted whole, so a reader sees either all of a text's
/// tokens or none of them. Inserting needs `&mut self`: only the gate that
/// owns the pool grows it.
#[derive(Debug, Default)]
pub struct AcceptedPool {
    entries: RwLock<Vec<Arc<TokenSet>>>,
}

impl AcceptedPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest Jaccard similarity of `tokens` against any accepted text.
    pub fn max_similarity(&self, tokens: &TokenSet) -> f64 {
        self.entries
            .read()
            .iter()
            .map(|entry| jaccard(tokens, entry))
            .fold(0.0, f64::max)
    }

    pub fn insert(&mut self, tokens: TokenSet) {
        self.entries.get_mut().push(Arc::new(tokens));
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
