use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::decision::{GateDecision, GateState};
use super::error::GateResult;
use crate::batch::{BatchLayout, Citation, Turn, turn_file_stem};
use crate::storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Accepted,
    Rejected,
    Review,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Accepted, Bucket::Rejected, Bucket::Review];

    /// Buckets a decision belongs in: `accepted`, or `rejected` + `review`.
    pub fn targets(state: GateState) -> &'static [Bucket] {
        match state {
            GateState::Accepted => &[Bucket::Accepted],
            _ => &[Bucket::Rejected, Bucket::Review],
        }
    }
}

/// Bucket file body: the decision plus the text it applies to.
#[derive(Serialize)]
struct RoutedTurn<'a> {
    #[serde(flatten)]
    decision: &'a GateDecision,
    text: &'a str,
    citations: &'a [Citation],
}

/// Writes gate decisions into the `accepted/`, `rejected/` and `review/` queues.
///
/// Routing is idempotent: a turn's file is written atomically to its target
/// buckets and removed from every other bucket, so re-gating a batch leaves
/// each turn in exactly one place.
#[derive(Debug, Clone)]
pub struct QueueWriter {
    accepted: PathBuf,
    rejected: PathBuf,
    review: PathBuf,
}

impl QueueWriter {
    pub fn new(layout: &BatchLayout) -> Self {
        Self {
            accepted: layout.accepted(),
            rejected: layout.rejected(),
            review: layout.review(),
        }
    }

    pub fn dir(&self, bucket: Bucket) -> &Path {
        match bucket {
            Bucket::Accepted => &self.accepted,
            Bucket::Rejected => &self.rejected,
            Bucket::Review => &self.review,
        }
    }

    pub fn path(&self, bucket: Bucket, turn_id: &str) -> PathBuf {
        self.dir(bucket)
            .join(format!("{}.json", turn_file_stem(turn_id)))
    }

    /// Routes `turn` by `decision.state`; returns the files written.
    pub fn route(&self, decision: &GateDecision, turn: &Turn) -> GateResult<Vec<PathBuf>> {
        let targets = Bucket::targets(decision.state);
        let body = RoutedTurn {
            decision,
            text: &turn.text,
            citations: &turn.citations,
        };

        let mut written = Vec::with_capacity(targets.len());
        for bucket in targets {
            let path = self.path(*bucket, &decision.turn_id);
            storage::write_json_atomic(&path, &body)?;
            written.push(path);
        }
        for bucket in Bucket::ALL.iter().filter(|b| !targets.contains(*b)) {
            if storage::remove_if_exists(&self.path(*bucket, &decision.turn_id))? {
                debug!(turn_id = %decision.turn_id, ?bucket, "Removed stale queue entry");
            }
        }
        Ok(written)
    }
}
