use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::error::{BatchError, BatchResult};
use super::layout::BatchLayout;
use super::loader::{LoadedTurns, load_turns};
use super::turn::Turn;
use crate::audit::{AuditBuilder, read_audit, write_audit};
use crate::gate::{QualityGate, QueueWriter, RunSummary};
use crate::storage;

/// Counts from an audit pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub audited: usize,
    pub claims: usize,
    pub supported: usize,
    /// Turn files skipped while loading.
    pub skipped: usize,
}

/// Drives one batch through audit and gate.
///
/// Audits run concurrently on the blocking pool, bounded by `concurrency`.
/// Gating is sequential in ascending turn-id order so that novelty against
/// the accepted pool is reproducible.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    layout: BatchLayout,
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(layout: BatchLayout) -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self { layout, concurrency }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn layout(&self) -> &BatchLayout {
        &self.layout
    }

    pub fn load(&self) -> BatchResult<LoadedTurns> {
        load_turns(&self.layout.generated())
    }

    /// Audits every generated turn and writes `audits/<turn_id>.json`.
    pub async fn audit(&self, builder: Arc<AuditBuilder>) -> BatchResult<AuditReport> {
        self.layout.ensure_output_dirs()?;
        let loaded = self.load()?;
        let mut report = self.audit_turns(builder, loaded.turns).await?;
        report.skipped = loaded.skipped;
        Ok(report)
    }

    async fn audit_turns(&self, builder: Arc<AuditBuilder>, turns: Vec<Turn>) -> BatchResult<AuditReport> {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let audits_dir = self.layout.audits();
        let claim_files = builder.config().write_claim_files;
        let mut tasks = JoinSet::new();

        for turn in turns {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| BatchError::Join { reason: e.to_string() })?;
            let builder = builder.clone();
            let audits_dir = audits_dir.clone();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                let record = builder.audit_turn(&turn);
                write_audit(&audits_dir, &record, claim_files).map(|_| record)
            });
        }

        let mut report = AuditReport::default();
        while let Some(joined) = tasks.join_next().await {
            let record = joined.map_err(|e| BatchError::Join { reason: e.to_string() })??;
            report.audited += 1;
            report.claims += record.claims_total;
            report.supported += record.correct;
        }

        info!(
            batch_id = %self.layout.batch_id(),
            audited = report.audited,
            claims = report.claims,
            supported = report.supported,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Audit pass complete"
        );
        Ok(report)
    }

    /// Gates every generated turn against its audit and writes `summary.json`.
    ///
    /// Turns whose audit cannot be read, does not parse or names another
    /// turn are skipped and counted.
    pub fn gate(&self, gate: QualityGate) -> BatchResult<RunSummary> {
        self.layout.ensure_output_dirs()?;
        let loaded = self.load()?;
        self.gate_turns(gate, &loaded)
    }

    fn gate_turns(&self, gate: QualityGate, loaded: &LoadedTurns) -> BatchResult<RunSummary> {
        let mut gate = gate.with_queue(QueueWriter::new(&self.layout));
        let audits_dir = self.layout.audits();
        gate.counters().record_skipped(loaded.skipped);

        // `loaded.turns` is sorted by id.
        for turn in &loaded.turns {
            let audit = match read_audit(&audits_dir, &turn.id) {
                Ok(audit) => audit,
                Err(e) if e.is_skippable() => {
                    warn!(turn_id = %turn.id, error = %e, "Skipping turn without a usable audit");
                    gate.counters().record_skipped(1);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            gate.process(turn, &audit)?;
        }

        let summary = gate.summary(self.layout.batch_id());
        storage::write_json_atomic(&self.layout.summary_path(), &summary)?;
        info!(
            batch_id = %summary.batch_id,
            turns_total = summary.turns_total,
            accepted = summary.accepted,
            rejected = summary.rejected,
            skipped = summary.skipped,
            support_rate_avg = summary.kpis.support_rate_avg,
            "Gate pass complete"
        );
        Ok(summary)
    }

    /// Audit then gate, from a single read of `generated/`.
    pub async fn run(&self, builder: Arc<AuditBuilder>, gate: QualityGate) -> BatchResult<RunSummary> {
        self.layout.ensure_output_dirs()?;
        let loaded = self.load()?;
        self.audit_turns(builder, loaded.turns.clone()).await?;
        self.gate_turns(gate, &loaded)
    }
}
