//! Quality Gate: turn-level metrics, thresholds and routing.
//!
//! For each audited turn the gate computes [`TurnMetrics`], checks every
//! predicate of [`GateThresholds`] (all failures are reported, none
//! short-circuit) and settles the turn:
//!
//! ```text
//! Pending ──pass──▶ Accepted
//!    │
//!    └─fail─▶ RetryPending ──pass──▶ Accepted
//!                  │
//!                  └─fail─▶ Rejected (+ review)
//! ```
//!
//! Accepted texts join an [`AcceptedPool`] that later turns are compared
//! against for novelty, so gating order matters and is fixed by the caller.

mod decision;
mod error;
mod metrics;
mod pool;
mod quality_gate;
mod queue;
mod retry;
mod summary;
mod thresholds;

#[cfg(test)]
mod tests;

pub use decision::{GateDecision, GateState};
pub use error::{GateError, GateResult};
pub use metrics::{TokenSet, TurnMetrics, jaccard, token_set, toxicity_ratio, word_count};
pub use pool::AcceptedPool;
pub use quality_gate::QualityGate;
pub use queue::{Bucket, QueueWriter};
pub use retry::{ReevaluateRetry, RetryCandidate, RetryStrategy};
pub use summary::{Kpis, RunCounters, RunSummary};
pub use thresholds::{GateConfig, GateThresholds};
