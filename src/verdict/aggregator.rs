use std::sync::Arc;

use tracing::{debug, warn};

use super::types::{EvidenceAssessment, Verdict, VerdictRecord};
use crate::claims::Claim;
use crate::embedding::{EntailmentScorer, NliScores, ScorerContext};
use crate::retrieval::EvidenceResult;

#[derive(Clone, Default)]
pub struct VerdictAggregator {
    scorer: Option<Arc<dyn EntailmentScorer>>,
}

impl std::fmt::Debug for VerdictAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerdictAggregator")
            .field("has_scorer", &self.scorer.is_some())
            .finish()
    }
}

impl VerdictAggregator {
    pub fn new(scorer: Option<Arc<dyn EntailmentScorer>>) -> Self {
        Self { scorer }
    }

    pub fn from_context(scorers: &ScorerContext) -> Self {
        Self::new(scorers.entailment().cloned())
    }

    pub fn has_scorer(&self) -> bool {
        self.scorer.is_some()
    }

    /// Scores `claim` against every evidence item and decides its verdict.
    ///
    /// Never fails: a missing scorer yields `uncertain`, and a failing call
    /// contributes zero scores for that item only.
    pub fn verdict(&self, claim: &Claim, evidence: &[EvidenceResult]) -> VerdictRecord {
        let Some(scorer) = &self.scorer else {
            return VerdictRecord {
                claim: claim.clone(),
                verdict: Verdict::Uncertain,
                evidence: evidence
                    .iter()
                    .map(|e| EvidenceAssessment::new(e, NliScores::ZERO))
                    .collect(),
                scores: NliScores::ZERO,
                note: Some("no entailment scorer available".to_string()),
            };
        };

        let mut best = NliScores::ZERO;
        let mut failures = 0usize;
        let mut assessed = Vec::with_capacity(evidence.len());

        for item in evidence {
            let scores = match scorer.classify(&item.chunk.text, &claim.text) {
                Ok(s) => s.clamped(),
                Err(e) => {
                    warn!(
                        turn_id = %claim.turn_id,
                        claim_id = claim.index,
                        chunk_id = %item.chunk.id,
                        error = %e,
                        "Entailment call failed; scoring evidence as zero"
                    );
                    failures += 1;
                    NliScores::ZERO
                }
            };
            best = best.max(scores);
            assessed.push(EvidenceAssessment::new(item, scores));
        }

        let verdict = Verdict::decide(best);
        debug!(
            turn_id = %claim.turn_id,
            claim_id = claim.index,
            evidence = evidence.len(),
            %verdict,
            "Claim scored"
        );

        VerdictRecord {
            claim: claim.clone(),
            verdict,
            evidence: assessed,
            scores: best,
            note: (failures > 0)
                .then(|| format!("{failures} of {} entailment calls failed", evidence.len())),
        }
    }
}
