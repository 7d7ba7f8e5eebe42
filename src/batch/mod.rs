//! Batch layout, turn loading and the audit → gate runner.
//!
//! A batch lives under `<runs>/<batch_id>/`: generated turns are read from
//! `generated/`, audits are written to `audits/`, gate decisions to
//! `accepted/`, `rejected/` and `review/`, and counts to `summary.json`.

mod error;
mod layout;
mod loader;
mod runner;
mod turn;

#[cfg(test)]
mod tests;

pub use error::{BatchError, BatchResult};
pub use layout::{
    ACCEPTED_DIR, AUDITS_DIR, BatchLayout, GENERATED_DIR, REJECTED_DIR, REVIEW_DIR, SUMMARY_FILE,
    turn_file_stem,
};
pub use loader::{LoadedTurns, load_turns};
pub use runner::{AuditReport, BatchRunner};
pub use turn::{Citation, Turn};
