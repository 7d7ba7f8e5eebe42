use std::sync::Arc;

use tracing::{info, warn};

use super::record::AuditRecord;
use crate::batch::Turn;
use crate::claims::{ClaimExtractor, SentenceClaimExtractor};
use crate::constants::DEFAULT_EVIDENCE_PER_CLAIM;
use crate::retrieval::{HybridRetriever, SearchParams};
use crate::verdict::{VerdictAggregator, VerdictRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditConfig {
    /// Evidence items retrieved per claim; overrides `search.top_k`.
    pub evidence_per_claim: usize,
    pub search: SearchParams,
    /// Also write `audits/<turn_id>.claim<i>.json`.
    pub write_claim_files: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            evidence_per_claim: DEFAULT_EVIDENCE_PER_CLAIM,
            search: SearchParams::default(),
            write_claim_files: false,
        }
    }
}

/// Runs claim extraction, retrieval and verdicts for one turn at a time.
///
/// Holds only shared read-only state, so one builder serves all concurrent
/// audits of a batch.
pub struct AuditBuilder {
    retriever: Arc<HybridRetriever>,
    extractor: Arc<dyn ClaimExtractor>,
    aggregator: VerdictAggregator,
    config: AuditConfig,
}

impl std::fmt::Debug for AuditBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditBuilder")
            .field("retriever", &self.retriever)
            .field("aggregator", &self.aggregator)
            .field("config", &self.config)
            .finish()
    }
}

impl AuditBuilder {
    /// Builder with a sentence splitter and the retriever's entailment scorer.
    pub fn new(retriever: Arc<HybridRetriever>) -> Self {
        let aggregator = VerdictAggregator::from_context(retriever.scorers());
        Self {
            retriever,
            extractor: Arc::new(SentenceClaimExtractor::new()),
            aggregator,
            config: AuditConfig::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ClaimExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_aggregator(mut self, aggregator: VerdictAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn with_config(mut self, config: AuditConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn audit_turn(&self, turn: &Turn) -> AuditRecord {
        let claims = match self.extractor.extract(&turn.id, &turn.text) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(turn_id = %turn.id, error = %e, "Claim extraction failed; auditing zero claims");
                return AuditRecord::new(&turn.id, Vec::new(), Some(format!("claim extraction failed: {e}")));
            }
        };

        let params = self.config.search.with_top_k(self.config.evidence_per_claim);
        let verdicts: Vec<VerdictRecord> = claims
            .into_iter()
            .map(|claim| match self.retriever.search(&claim.text, &params) {
                Ok(evidence) => self.aggregator.verdict(&claim, &evidence),
                Err(e) => {
                    warn!(
                        turn_id = %turn.id,
                        claim_id = claim.index,
                        error = %e,
                        "Retrieval failed; claim marked uncertain"
                    );
                    VerdictRecord::uncertain(claim, format!("retrieval failed: {e}"))
                }
            })
            .collect();

        let record = AuditRecord::new(&turn.id, verdicts, None);
        info!(
            turn_id = %record.turn_id,
            claims = record.claims_total,
            correct = record.correct,
            support_rate = record.support_rate,
            "Turn audited"
        );
        record
    }
}
