use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::TurnMetrics;
use super::thresholds::GateThresholds;

/// Gate lifecycle of a turn: `Pending → Accepted | RetryPending → Accepted | Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Pending,
    RetryPending,
    Accepted,
    Rejected,
}

impl GateState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GateState::Accepted | GateState::Rejected)
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateState::Pending => "pending",
            GateState::RetryPending => "retry_pending",
            GateState::Accepted => "accepted",
            GateState::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Outcome of gating one turn. Written once, to exactly one terminal bucket
/// (plus `review` when rejected).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub turn_id: String,
    /// Result of the first evaluation.
    pub passed: bool,
    /// Terminal state after the optional retry.
    pub state: GateState,
    pub metrics: TurnMetrics,
    pub thresholds: GateThresholds,
    pub reasons: Vec<String>,
    pub retried: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_metrics: Option<TurnMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_passed: Option<bool>,
    #[serde(default)]
    pub retry_reasons: Vec<String>,
    pub decided_at: DateTime<Utc>,
}

impl GateDecision {
    pub fn accepted(&self) -> bool {
        self.state == GateState::Accepted
    }

    /// Metrics of the evaluation that decided the turn.
    pub fn final_metrics(&self) -> &TurnMetrics {
        self.retry_metrics.as_ref().unwrap_or(&self.metrics)
    }
}
