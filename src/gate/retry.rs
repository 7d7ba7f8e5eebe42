use crate::audit::AuditRecord;
use crate::batch::Turn;

use super::error::GateResult;

/// A possibly revised turn and its audit, handed back for re-evaluation.
#[derive(Debug, Clone)]
pub struct RetryCandidate {
    pub turn: Turn,
    pub audit: AuditRecord,
}

/// Produces the second attempt for a turn that failed the gate.
///
/// Implementations may resample text and re-audit it; the gate only
/// re-evaluates what it is given. An error counts as a failed retry.
pub trait RetryStrategy: Send + Sync {
    fn retry(&self, turn: &Turn, audit: &AuditRecord, reasons: &[String]) -> GateResult<RetryCandidate>;
}

/// Re-evaluates the unchanged turn and audit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReevaluateRetry;

impl RetryStrategy for ReevaluateRetry {
    fn retry(&self, turn: &Turn, audit: &AuditRecord, _reasons: &[String]) -> GateResult<RetryCandidate> {
        Ok(RetryCandidate {
            turn: turn.clone(),
            audit: audit.clone(),
        })
    }
}
