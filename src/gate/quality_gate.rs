use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::decision::{GateDecision, GateState};
use super::error::GateResult;
use super::metrics::{TokenSet, TurnMetrics, token_set, toxicity_ratio, word_count};
use super::pool::AcceptedPool;
use super::queue::QueueWriter;
use super::retry::{ReevaluateRetry, RetryStrategy};
use super::summary::{RunCounters, RunSummary};
use super::thresholds::GateConfig;
use crate::audit::AuditRecord;
use crate::batch::Turn;

/// Threshold gate with one bounded retry and a batch-wide accepted pool.
///
/// Turns must be fed to [`process`](Self::process) one at a time in a fixed
/// order: novelty is measured against earlier acceptances only.
/// `process` takes `&mut self`, so measuring a turn and growing the pool
/// cannot interleave with another turn.
pub struct QualityGate {
    config: GateConfig,
    pool: AcceptedPool,
    retry: Arc<dyn RetryStrategy>,
    queue: Option<QueueWriter>,
    counters: RunCounters,
}

impl std::fmt::Debug for QualityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityGate")
            .field("thresholds", &self.config.thresholds)
            .field("pool_size", &self.pool.len())
            .field("queue", &self.queue)
            .field("counters", &self.counters)
            .finish()
    }
}

impl QualityGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            pool: AcceptedPool::new(),
            retry: Arc::new(ReevaluateRetry),
            queue: None,
            counters: RunCounters::new(),
        }
    }

    pub fn with_retry(mut self, retry: Arc<dyn RetryStrategy>) -> Self {
        self.retry = retry;
        self
    }

    /// Routes every decision into the batch queues.
    pub fn with_queue(mut self, queue: QueueWriter) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn pool(&self) -> &AcceptedPool {
        &self.pool
    }

    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    pub fn summary(&self, batch_id: &str) -> RunSummary {
        self.counters.finalize(batch_id)
    }

    /// Computes metrics for `turn` against the current accepted pool.
    pub fn measure(&self, turn: &Turn, audit: &AuditRecord) -> (TurnMetrics, TokenSet) {
        let tokens = token_set(&turn.text);
        let metrics = TurnMetrics {
            support_rate: audit.support_rate,
            citation_count: turn.citations.len(),
            word_count: word_count(&turn.text),
            novelty_jaccard: self.pool.max_similarity(&tokens),
            toxicity_ratio: toxicity_ratio(&turn.text, &self.config.denylist),
        };
        (metrics, tokens)
    }

    /// Gates one turn: evaluate, retry once on failure, route, count.
    ///
    /// The accepted text joins the pool only after routing succeeded; on a
    /// routing error the pool and counters are unchanged.
    pub fn process(&mut self, turn: &Turn, audit: &AuditRecord) -> GateResult<GateDecision> {
        let thresholds = &self.config.thresholds;
        let (metrics, tokens) = self.measure(turn, audit);
        let reasons = metrics.failures(thresholds);
        let passed = reasons.is_empty();

        let mut decision = GateDecision {
            turn_id: turn.id.clone(),
            passed,
            state: GateState::Pending,
            metrics,
            thresholds: thresholds.clone(),
            reasons,
            retried: false,
            retry_metrics: None,
            retry_passed: None,
            retry_reasons: Vec::new(),
            decided_at: Utc::now(),
        };

        let (routed_turn, accepted_tokens) = if passed {
            decision.state = GateState::Accepted;
            (None, Some(tokens))
        } else {
            decision.state = GateState::RetryPending;
            debug!(turn_id = %turn.id, reasons = ?decision.reasons, "Gate failed; retrying once");
            self.retry_once(turn, audit, &mut decision)
        };

        decision.decided_at = Utc::now();
        if let Some(queue) = &self.queue {
            queue.route(&decision, routed_turn.as_ref().unwrap_or(turn))?;
        }
        if let Some(tokens) = accepted_tokens {
            self.pool.insert(tokens);
        }
        self.counters.record(&decision);

        info!(
            turn_id = %decision.turn_id,
            state = %decision.state,
            retried = decision.retried,
            support_rate = decision.final_metrics().support_rate,
            "Turn gated"
        );
        Ok(decision)
    }

    /// Runs the retry and settles `decision` in a terminal state. Returns the
    /// revised turn, if the retry produced one, and its tokens when accepted.
    fn retry_once(
        &self,
        turn: &Turn,
        audit: &AuditRecord,
        decision: &mut GateDecision,
    ) -> (Option<Turn>, Option<TokenSet>) {
        decision.retried = true;

        let candidate = match self.retry.retry(turn, audit, &decision.reasons) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(turn_id = %turn.id, error = %e, "Retry produced no candidate; rejecting");
                decision.retry_passed = Some(false);
                decision.retry_reasons = vec![e.to_string()];
                decision.state = GateState::Rejected;
                return (None, None);
            }
        };

        let (metrics, tokens) = self.measure(&candidate.turn, &candidate.audit);
        let reasons = metrics.failures(&self.config.thresholds);
        let passed = reasons.is_empty();

        decision.retry_metrics = Some(metrics);
        decision.retry_passed = Some(passed);
        decision.retry_reasons = reasons;
        if passed {
            decision.state = GateState::Accepted;
            (Some(candidate.turn), Some(tokens))
        } else {
            decision.state = GateState::Rejected;
            (Some(candidate.turn), None)
        }
    }
}
