use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::decision::GateDecision;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub support_rate_avg: f64,
    pub citations_avg: f64,
    pub novelty_max: f64,
}

/// Final per-batch counts, written to `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub batch_id: String,
    /// Turns that reached a terminal gate state.
    pub turns_total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub review: usize,
    /// Turn or audit files that could not be read.
    pub skipped: usize,
    pub kpis: Kpis,
    pub started_at: DateTime<Utc>,
    pub finalized_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct KpiSums {
    support_rate: f64,
    citations: usize,
    novelty_max: f64,
}

/// Batch counters updated once per gated turn.
///
/// Each decision increments exactly one of `accepted` / `rejected`.
#[derive(Debug)]
pub struct RunCounters {
    turns_total: AtomicUsize,
    accepted: AtomicUsize,
    rejected: AtomicUsize,
    review: AtomicUsize,
    skipped: AtomicUsize,
    kpis: Mutex<KpiSums>,
    started_at: DateTime<Utc>,
}

impl Default for RunCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl RunCounters {
    pub fn new() -> Self {
        Self {
            turns_total: AtomicUsize::new(0),
            accepted: AtomicUsize::new(0),
            rejected: AtomicUsize::new(0),
            review: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            kpis: Mutex::new(KpiSums::default()),
            started_at: Utc::now(),
        }
    }

    pub fn record(&self, decision: &GateDecision) {
        self.turns_total.fetch_add(1, Ordering::Relaxed);
        if decision.accepted() {
            self.accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            self.review.fetch_add(1, Ordering::Relaxed);
        }

        let metrics = decision.final_metrics();
        let mut kpis = self.kpis.lock();
        kpis.support_rate += metrics.support_rate;
        kpis.citations += metrics.citation_count;
        kpis.novelty_max = kpis.novelty_max.max(metrics.novelty_jaccard);
    }

    pub fn record_skipped(&self, count: usize) {
        self.skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn turns_total(&self) -> usize {
        self.turns_total.load(Ordering::Relaxed)
    }

    pub fn finalize(&self, batch_id: &str) -> RunSummary {
        let turns_total = self.turns_total();
        let kpis = self.kpis.lock();
        let avg = |sum: f64| if turns_total == 0 { 0.0 } else { sum / turns_total as f64 };

        RunSummary {
            batch_id: batch_id.to_string(),
            turns_total,
            accepted: self.accepted(),
            rejected: self.rejected(),
            review: self.review.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            kpis: Kpis {
                support_rate_avg: avg(kpis.support_rate),
                citations_avg: avg(kpis.citations as f64),
                novelty_max: kpis.novelty_max,
            },
            started_at: self.started_at,
            finalized_at: Utc::now(),
        }
    }
}
