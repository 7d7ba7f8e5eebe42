use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{AuditError, AuditResult};
use crate::batch::turn_file_stem;
use crate::storage;
use crate::verdict::VerdictRecord;

/// Per-turn audit outcome. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub turn_id: String,
    pub claims: Vec<VerdictRecord>,
    pub claims_total: usize,
    /// Claims whose verdict is `supported`.
    pub correct: usize,
    /// `correct / claims_total`, exactly `0.0` with no claims.
    pub support_rate: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AuditRecord {
    pub fn new(turn_id: impl Into<String>, claims: Vec<VerdictRecord>, note: Option<String>) -> Self {
        let claims_total = claims.len();
        let correct = claims.iter().filter(|c| c.verdict.is_supported()).count();
        let support_rate = if claims_total == 0 {
            0.0
        } else {
            correct as f64 / claims_total as f64
        };
        Self {
            turn_id: turn_id.into(),
            claims,
            claims_total,
            correct,
            support_rate,
            created_at: Utc::now(),
            note,
        }
    }
}

#[derive(Serialize)]
struct ClaimFile<'a> {
    #[serde(flatten)]
    record: &'a VerdictRecord,
    created_at: DateTime<Utc>,
}

pub fn audit_path(audits_dir: &Path, turn_id: &str) -> PathBuf {
    audits_dir.join(format!("{}.json", turn_file_stem(turn_id)))
}

pub fn claim_path(audits_dir: &Path, turn_id: &str, claim_index: usize) -> PathBuf {
    audits_dir.join(format!("{}.claim{claim_index}.json", turn_file_stem(turn_id)))
}

/// Writes `record` (and optionally one file per claim) atomically.
pub fn write_audit(audits_dir: &Path, record: &AuditRecord, claim_files: bool) -> AuditResult<PathBuf> {
    let path = audit_path(audits_dir, &record.turn_id);
    storage::write_json_atomic(&path, record)?;

    if claim_files {
        for claim in &record.claims {
            let file = ClaimFile {
                record: claim,
                created_at: record.created_at,
            };
            storage::write_json_atomic(
                &claim_path(audits_dir, &record.turn_id, claim.claim.index),
                &file,
            )?;
        }
    }
    Ok(path)
}

/// Reads the audit of `turn_id`, checking it belongs to that turn.
pub fn read_audit(audits_dir: &Path, turn_id: &str) -> AuditResult<AuditRecord> {
    let path = audit_path(audits_dir, turn_id);
    let record: AuditRecord = storage::read_json(&path)?;
    if record.turn_id != turn_id {
        return Err(AuditError::TurnMismatch {
            path,
            expected: turn_id.to_string(),
            actual: record.turn_id,
        });
    }
    Ok(record)
}
