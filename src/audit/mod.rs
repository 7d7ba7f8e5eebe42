//! Audit Builder: claims → evidence → verdicts, one [`AuditRecord`] per turn.
//!
//! An audit never fails as a whole. Extraction failure yields a record with
//! zero claims and a note; a retrieval failure marks only that claim
//! `uncertain`. Records are written to `audits/<turn_id>.json`, with optional
//! per-claim files `audits/<turn_id>.claim<i>.json`.

mod builder;
mod error;
mod record;


pub use builder::{AuditBuilder, AuditConfig};
pub use error::{AuditError, AuditResult};
pub use record::{AuditRecord, audit_path, claim_path, read_audit, write_audit};
