use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::thresholds::GateThresholds;
use crate::corpus::tokenize;

/// Distinct normalized tokens of a text.
pub type TokenSet = HashSet<String>;

pub fn token_set(text: &str) -> TokenSet {
    tokenize(text).into_iter().collect()
}

/// `|a ∩ b| / |a ∪ b|`; `0.0` when either set is empty.
pub fn jaccard(a: &TokenSet, b: &TokenSet) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Fraction of tokens found in `denylist`; `0.0` for a text with no tokens.
pub fn toxicity_ratio(text: &str, denylist: &HashSet<String>) -> f64 {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return 0.0;
    }
    let flagged = tokens.iter().filter(|t| denylist.contains(*t)).count();
    flagged as f64 / tokens.len() as f64
}

/// Turn-level quality measurements compared against [`GateThresholds`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnMetrics {
    pub support_rate: f64,
    pub citation_count: usize,
    pub word_count: usize,
    /// Highest Jaccard similarity against texts already accepted in the batch.
    pub novelty_jaccard: f64,
    pub toxicity_ratio: f64,
}

impl TurnMetrics {
    /// Evaluates every predicate and returns one reason per failure.
    ///
    /// An empty result means the turn passes.
    pub fn failures(&self, t: &GateThresholds) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.word_count < t.min_words {
            reasons.push(format!("word_count {} < min_words {}", self.word_count, t.min_words));
        }
        if self.word_count > t.max_words {
            reasons.push(format!("word_count {} > max_words {}", self.word_count, t.max_words));
        }
        if self.citation_count < t.min_citations {
            reasons.push(format!(
                "citation_count {} < min_citations {}",
                self.citation_count, t.min_citations
            ));
        }
        if self.citation_count > t.max_citations {
            reasons.push(format!(
                "citation_count {} > max_citations {}",
                self.citation_count, t.max_citations
            ));
        }
        if self.support_rate < t.min_support_rate {
            reasons.push(format!(
                "support_rate {:.3} < min_support_rate {:.3}",
                self.support_rate, t.min_support_rate
            ));
        }
        if self.novelty_jaccard > t.max_novelty_jaccard {
            reasons.push(format!(
                "novelty_jaccard {:.3} > max_novelty_jaccard {:.3}",
                self.novelty_jaccard, t.max_novelty_jaccard
            ));
        }
        if self.toxicity_ratio > t.max_toxicity_ratio {
            reasons.push(format!(
                "toxicity_ratio {:.3} > max_toxicity_ratio {:.3}",
                self.toxicity_ratio, t.max_toxicity_ratio
            ));
        }
        reasons
    }
}
