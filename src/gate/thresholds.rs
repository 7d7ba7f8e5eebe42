use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ConfigError;
use crate::corpus::tokenize;
use crate::storage;

/// Pass/fail bounds applied to [`TurnMetrics`](super::TurnMetrics).
///
/// Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateThresholds {
    pub min_words: usize,
    pub max_words: usize,
    pub min_citations: usize,
    pub max_citations: usize,
    pub min_support_rate: f64,
    pub max_novelty_jaccard: f64,
    pub max_toxicity_ratio: f64,
}

impl Default for GateThresholds {
    /// The stock profile. Never applied implicitly: a thresholds file must
    /// name every key.
    fn default() -> Self {
        Self {
            min_words: 40,
            max_words: 400,
            min_citations: 1,
            max_citations: 8,
            min_support_rate: 0.6,
            max_novelty_jaccard: 0.8,
            max_toxicity_ratio: 0.01,
        }
    }
}

impl GateThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_words > self.max_words {
            return Err(ConfigError::InvalidThreshold {
                reason: format!("min_words {} > max_words {}", self.min_words, self.max_words),
            });
        }
        if self.min_citations > self.max_citations {
            return Err(ConfigError::InvalidThreshold {
                reason: format!(
                    "min_citations {} > max_citations {}",
                    self.min_citations, self.max_citations
                ),
            });
        }
        for (name, value) in [
            ("min_support_rate", self.min_support_rate),
            ("max_novelty_jaccard", self.max_novelty_jaccard),
            ("max_toxicity_ratio", self.max_toxicity_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold {
                    reason: format!("{name} {value} is outside [0, 1]"),
                });
            }
        }
        Ok(())
    }
}

/// Thresholds plus the token denylist used for the toxicity ratio.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GateConfig {
    pub thresholds: GateThresholds,
    pub denylist: HashSet<String>,
}

/// On-disk form. Every threshold key is optional here so a missing one can be
/// reported by name.
#[derive(Debug, Deserialize)]
struct RawGateConfig {
    min_words: Option<usize>,
    max_words: Option<usize>,
    min_citations: Option<usize>,
    max_citations: Option<usize>,
    min_support_rate: Option<f64>,
    max_novelty_jaccard: Option<f64>,
    max_toxicity_ratio: Option<f64>,
    #[serde(default)]
    denylist: Vec<String>,
}

impl GateConfig {
    pub fn new(thresholds: GateThresholds) -> Self {
        Self {
            thresholds,
            denylist: HashSet::new(),
        }
    }

    /// Adds denylisted words, normalized the same way turn text is tokenized.
    pub fn with_denylist<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.denylist
            .extend(words.into_iter().flat_map(|w| tokenize(w.as_ref())));
        self
    }

    /// Loads a thresholds JSON file.
    ///
    /// Fails with [`ConfigError::MissingThreshold`] naming the first absent key.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        let raw: RawGateConfig = storage::read_json(path)?;

        let missing = |key: &'static str| ConfigError::MissingThreshold {
            key,
            path: path.to_path_buf(),
        };
        let thresholds = GateThresholds {
            min_words: raw.min_words.ok_or_else(|| missing("min_words"))?,
            max_words: raw.max_words.ok_or_else(|| missing("max_words"))?,
            min_citations: raw.min_citations.ok_or_else(|| missing("min_citations"))?,
            max_citations: raw.max_citations.ok_or_else(|| missing("max_citations"))?,
            min_support_rate: raw.min_support_rate.ok_or_else(|| missing("min_support_rate"))?,
            max_novelty_jaccard: raw
                .max_novelty_jaccard
                .ok_or_else(|| missing("max_novelty_jaccard"))?,
            max_toxicity_ratio: raw
                .max_toxicity_ratio
                .ok_or_else(|| missing("max_toxicity_ratio"))?,
        };
        thresholds.validate()?;

        let config = Self::new(thresholds).with_denylist(raw.denylist);
        info!(
            path = %path.display(),
            denylist = config.denylist.len(),
            "Gate thresholds loaded"
        );
        Ok(config)
    }
}
