use std::fmt;

use serde::{Deserialize, Serialize};

use crate::claims::Claim;
use crate::embedding::NliScores;
use crate::retrieval::EvidenceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Supported,
    Refuted,
    Uncertain,
}

impl Verdict {
    /// Applies the ordered decision rule to aggregated scores.
    ///
    /// Ties never produce `Supported`. Contradiction wins over entailment
    /// when strictly greater, and also on an exact tie that beats neutral.
    pub fn decide(scores: NliScores) -> Verdict {
        let NliScores {
            entailment: ent,
            contradiction: con,
            neutral: neu,
        } = scores;
        if ent > con && ent > neu {
            Verdict::Supported
        } else if con > ent || (con == ent && con > neu) {
            Verdict::Refuted
        } else {
            Verdict::Uncertain
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Verdict::Supported)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Supported => "supported",
            Verdict::Refuted => "refuted",
            Verdict::Uncertain => "uncertain",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evidence item as scored for a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceAssessment {
    pub chunk_id: String,
    pub source_ref: String,
    pub text: String,
    pub retrieval_score: f64,
    pub entailment: f32,
    pub contradiction: f32,
    pub neutral: f32,
}

impl EvidenceAssessment {
    pub fn new(evidence: &EvidenceResult, scores: NliScores) -> Self {
        Self {
            chunk_id: evidence.chunk.id.clone(),
            source_ref: evidence.chunk.source_ref.clone(),
            text: evidence.chunk.text.clone(),
            retrieval_score: evidence.score(),
            entailment: scores.entailment,
            contradiction: scores.contradiction,
            neutral: scores.neutral,
        }
    }

    pub fn scores(&self) -> NliScores {
        NliScores::new(self.entailment, self.contradiction, self.neutral)
    }
}

/// Verdict for one claim with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictRecord {
    #[serde(flatten)]
    pub claim: Claim,
    pub verdict: Verdict,
    pub evidence: Vec<EvidenceAssessment>,
    /// Label-wise maxima over `evidence`.
    pub scores: NliScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl VerdictRecord {
    /// An `uncertain` record with no evidence, e.g. after a retrieval failure.
    pub fn uncertain(claim: Claim, note: impl Into<String>) -> Self {
        Self {
            claim,
            verdict: Verdict::Uncertain,
            evidence: Vec::new(),
            scores: NliScores::ZERO,
            note: Some(note.into()),
        }
    }
}
