use std::path::{Path, PathBuf};

use crate::storage::{self, StorageError};

pub const GENERATED_DIR: &str = "generated";
pub const AUDITS_DIR: &str = "audits";
pub const ACCEPTED_DIR: &str = "accepted";
pub const REJECTED_DIR: &str = "rejected";
pub const REVIEW_DIR: &str = "review";
pub const SUMMARY_FILE: &str = "summary.json";

/// Directory layout of one batch: `<runs>/<batch_id>/...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLayout {
    batch_id: String,
    root: PathBuf,
}

impl BatchLayout {
    pub fn new(runs_dir: &Path, batch_id: impl Into<String>) -> Self {
        let batch_id = batch_id.into();
        Self {
            root: runs_dir.join(&batch_id),
            batch_id,
        }
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn generated(&self) -> PathBuf {
        self.root.join(GENERATED_DIR)
    }

    pub fn audits(&self) -> PathBuf {
        self.root.join(AUDITS_DIR)
    }

    pub fn accepted(&self) -> PathBuf {
        self.root.join(ACCEPTED_DIR)
    }

    pub fn rejected(&self) -> PathBuf {
        self.root.join(REJECTED_DIR)
    }

    pub fn review(&self) -> PathBuf {
        self.root.join(REVIEW_DIR)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    /// Creates the output directories. `generated/` is input and left alone.
    pub fn ensure_output_dirs(&self) -> Result<(), StorageError> {
        for dir in [self.audits(), self.accepted(), self.rejected(), self.review()] {
            storage::ensure_dir(&dir)?;
        }
        Ok(())
    }
}

/// File name used for a turn's artifacts.
///
/// Path separators, `:` and `%` are percent-encoded, so distinct ids never
/// share a stem.
pub fn turn_file_stem(turn_id: &str) -> String {
    let mut stem = String::with_capacity(turn_id.len());
    for c in turn_id.chars() {
        match c {
            '%' => stem.push_str("%25"),
            '/' => stem.push_str("%2F"),
            '\\' => stem.push_str("%5C"),
            ':' => stem.push_str("%3A"),
            c => stem.push(c),
        }
    }
    stem
}
