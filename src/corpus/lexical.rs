//! BM25 lexical index.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::tokenize::tokenize;
use crate::constants::{BM25_B, BM25_K1};

#[derive(Debug, Clone)]
struct DocStats {
    term_freqs: HashMap<String, u32>,
    len: u32,
}

/// Tokenized documents plus the statistics BM25 needs.
///
/// Position `i` corresponds to chunk `i` of the owning
/// [`IndexStore`](super::IndexStore).
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    docs: Vec<DocStats>,
    doc_freqs: HashMap<String, u32>,
    avg_doc_len: f32,
    k1: f32,
    b: f32,
}

/// On-disk form: the token lists only. Statistics are recomputed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LexicalSnapshot {
    pub k1: f32,
    pub b: f32,
    pub docs: Vec<Vec<String>>,
}

impl LexicalIndex {
    /// Builds an index over `texts` with default BM25 parameters.
    pub fn build<S: AsRef<str>>(texts: &[S]) -> Self {
        let docs = texts.iter().map(|t| tokenize(t.as_ref())).collect();
        Self::from_tokens(docs, BM25_K1, BM25_B)
    }

    pub(crate) fn from_tokens(token_docs: Vec<Vec<String>>, k1: f32, b: f32) -> Self {
        let mut doc_freqs: HashMap<String, u32> = HashMap::new();
        let mut total_len: u64 = 0;

        let docs: Vec<DocStats> = token_docs
            .into_iter()
            .map(|tokens| {
                let mut term_freqs: HashMap<String, u32> = HashMap::new();
                for t in &tokens {
                    *term_freqs.entry(t.clone()).or_default() += 1;
                }
                for term in term_freqs.keys() {
                    *doc_freqs.entry(term.clone()).or_default() += 1;
                }
                total_len += tokens.len() as u64;
                DocStats {
                    term_freqs,
                    len: tokens.len() as u32,
                }
            })
            .collect();

        let avg_doc_len = if docs.is_empty() {
            0.0
        } else {
            total_len as f32 / docs.len() as f32
        };

        Self {
            docs,
            doc_freqs,
            avg_doc_len,
            k1,
            b,
        }
    }

    pub(crate) fn snapshot(&self, token_docs: Vec<Vec<String>>) -> LexicalSnapshot {
        LexicalSnapshot {
            k1: self.k1,
            b: self.b,
            docs: token_docs,
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Inverse document frequency, `ln(1 + (N - n + 0.5) / (n + 0.5))`.
    ///
    /// Always positive, so a term present in half the corpus still counts.
    pub fn idf(&self, term: &str) -> f32 {
        let n = self.docs.len() as f32;
        let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// BM25 score of every document against `query_tokens`, by position.
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f32> {
        let avg = self.avg_doc_len.max(1.0);
        let idfs: Vec<(&str, f32)> = query_tokens
            .iter()
            .filter(|t| self.doc_freqs.contains_key(t.as_str()))
            .map(|t| (t.as_str(), self.idf(t)))
            .collect();

        self.docs
            .iter()
            .map(|doc| {
                let dl = doc.len as f32;
                idfs.iter()
                    .map(|(term, idf)| {
                        let tf = doc.term_freqs.get(*term).copied().unwrap_or(0) as f32;
                        if tf == 0.0 {
                            return 0.0;
                        }
                        idf * (tf * (self.k1 + 1.0))
                            / (tf + self.k1 * (1.0 - self.b + self.b * dl / avg))
                    })
                    .sum()
            })
            .collect()
    }

    /// Top `k` positions with a positive score, best first.
    ///
    /// Ties keep corpus order.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<(usize, f32)> {
        if k == 0 {
            return Vec::new();
        }
        let query_tokens = tokenize(query);
        let mut hits: Vec<(usize, f32)> = self
            .scores(&query_tokens)
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s > 0.0)
            .collect();
        sort_desc_stable(&mut hits);
        hits.truncate(k);
        hits
    }
}

/// Sorts `(position, score)` by score descending, then position ascending.
pub(crate) fn sort_desc_stable(hits: &mut [(usize, f32)]) {
    hits.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
}
