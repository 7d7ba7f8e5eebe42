use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::ClaimError;

const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];

/// One checkable statement taken from a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub turn_id: String,
    /// Position of the claim within its turn, from 0.
    #[serde(rename = "claim_id")]
    pub index: usize,
    #[serde(rename = "claim_text")]
    pub text: String,
}

impl Claim {
    pub fn new(turn_id: impl Into<String>, index: usize, text: impl Into<String>) -> Self {
        Self {
            turn_id: turn_id.into(),
            index,
            text: text.into(),
        }
    }
}

pub trait ClaimExtractor: Send + Sync {
    fn extract(&self, turn_id: &str, text: &str) -> Result<Vec<Claim>, ClaimError>;
}

/// Decides whether a sentence states a checkable fact.
pub trait ClaimClassifier: Send + Sync {
    fn is_claim(&self, sentence: &str) -> Result<bool, ClaimError>;
}

/// Splits `text` on `.`, `!` and `?`, trimming and dropping empty pieces.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(SENTENCE_TERMINATORS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sentence-level extractor with an optional claim/non-claim filter.
#[derive(Clone, Default)]
pub struct SentenceClaimExtractor {
    classifier: Option<Arc<dyn ClaimClassifier>>,
}

impl std::fmt::Debug for SentenceClaimExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceClaimExtractor")
            .field("has_classifier", &self.classifier.is_some())
            .finish()
    }
}

impl SentenceClaimExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ClaimClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    fn keep(&self, sentence: &str) -> bool {
        let Some(classifier) = &self.classifier else {
            return true;
        };
        match classifier.is_claim(sentence) {
            Ok(keep) => keep,
            Err(e) => {
                warn!(error = %e, "Claim classifier failed; keeping sentence");
                true
            }
        }
    }
}

impl ClaimExtractor for SentenceClaimExtractor {
    fn extract(&self, turn_id: &str, text: &str) -> Result<Vec<Claim>, ClaimError> {
        let sentences = split_sentences(text);
        let total = sentences.len();
        let claims: Vec<Claim> = sentences
            .into_iter()
            .filter(|s| self.keep(s))
            .enumerate()
            .map(|(index, s)| Claim::new(turn_id, index, s))
            .collect();

        debug!(
            turn_id,
            sentences = total,
            claims = claims.len(),
            "Extracted claims"
        );
        Ok(claims)
    }
}
