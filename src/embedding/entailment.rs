use serde::{Deserialize, Serialize};

use super::error::ScoringError;

/// Per-label NLI scores. Each value is in `[0, 1]`; they need not sum to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NliScores {
    pub entailment: f32,
    pub contradiction: f32,
    pub neutral: f32,
}

impl NliScores {
    pub const ZERO: NliScores = NliScores {
        entailment: 0.0,
        contradiction: 0.0,
        neutral: 0.0,
    };

    pub fn new(entailment: f32, contradiction: f32, neutral: f32) -> Self {
        Self {
            entailment,
            contradiction,
            neutral,
        }
    }

    /// Label-wise maximum of `self` and `other`.
    #[inline]
    pub fn max(self, other: NliScores) -> NliScores {
        NliScores {
            entailment: self.entailment.max(other.entailment),
            contradiction: self.contradiction.max(other.contradiction),
            neutral: self.neutral.max(other.neutral),
        }
    }

    /// Clamps every label into `[0, 1]`, mapping NaN to `0.0`.
    pub fn clamped(self) -> NliScores {
        fn clamp(v: f32) -> f32 {
            if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
        }
        NliScores {
            entailment: clamp(self.entailment),
            contradiction: clamp(self.contradiction),
            neutral: clamp(self.neutral),
        }
    }
}

/// Natural-language-inference classifier.
pub trait EntailmentScorer: Send + Sync {
    /// Scores whether `premise` (evidence) entails, contradicts or is neutral
    /// toward `hypothesis` (claim).
    fn classify(&self, premise: &str, hypothesis: &str) -> Result<NliScores, ScoringError>;
}
