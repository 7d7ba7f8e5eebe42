use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use super::*;
use crate::audit::AuditRecord;
use crate::batch::{BatchLayout, Citation, Turn};
use crate::config::ConfigError;

fn lenient() -> GateThresholds {
    GateThresholds {
        min_words: 3,
        max_words: 100,
        min_citations: 1,
        max_citations: 4,
        min_support_rate: 0.5,
        max_novelty_jaccard: 0.8,
        max_toxicity_ratio: 0.1,
    }
}

fn audit_with_rate(turn_id: &str, support_rate: f64) -> AuditRecord {
    let mut record = AuditRecord::new(turn_id, Vec::new(), None);
    record.support_rate = support_rate;
    record
}

fn cited(id: &str, text: &str) -> Turn {
    Turn::new(id, text).with_citations(vec![Citation::new("Summa", "I q.1 a.1")])
}

fn queued_gate(thresholds: GateThresholds) -> (QualityGate, QueueWriter, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let layout = BatchLayout::new(dir.path(), "b1");
    layout.ensure_output_dirs().expect("dirs");
    let queue = QueueWriter::new(&layout);
    let gate = QualityGate::new(GateConfig::new(thresholds)).with_queue(queue.clone());
    (gate, queue, dir)
}

/// Replaces the text with a fixed revision and reports full support.
struct RewriteRetry {
    text: String,
    calls: AtomicUsize,
}

impl RetryStrategy for RewriteRetry {
    fn retry(&self, turn: &Turn, _audit: &AuditRecord, _reasons: &[String]) -> GateResult<RetryCandidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let revised = Turn {
            text: self.text.clone(),
            ..turn.clone()
        };
        Ok(RetryCandidate {
            audit: audit_with_rate(&turn.id, 1.0),
            turn: revised,
        })
    }
}

struct BrokenRetry;

impl RetryStrategy for BrokenRetry {
    fn retry(&self, _turn: &Turn, _audit: &AuditRecord, _reasons: &[String]) -> GateResult<RetryCandidate> {
        Err(GateError::RetryFailed {
            reason: "generator offline".to_string(),
        })
    }
}

// ==================== metrics ====================

#[test]
fn test_jaccard_bounds() {
    let a = token_set("gratia perficit naturam");
    let b = token_set("gratia perficit naturam");
    let c = token_set("luna caseus");
    assert_eq!(jaccard(&a, &b), 1.0);
    assert_eq!(jaccard(&a, &c), 0.0);
    assert_eq!(jaccard(&a, &TokenSet::new()), 0.0);

    let d = token_set("gratia perficit");
    assert!((jaccard(&a, &d) - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_toxicity_ratio_uses_tokenized_denylist() {
    let config = GateConfig::default().with_denylist(["Stultus"]);
    let ratio = toxicity_ratio("stultus est homo qui dicit", &config.denylist);
    assert!((ratio - 0.2).abs() < 1e-12);
    assert_eq!(toxicity_ratio("", &config.denylist), 0.0);
}

#[test]
fn test_failures_reports_every_predicate() {
    let metrics = TurnMetrics {
        support_rate: 0.0,
        citation_count: 0,
        word_count: 0,
        novelty_jaccard: 1.0,
        toxicity_ratio: 0.5,
    };
    let reasons = metrics.failures(&GateThresholds::default());
    assert_eq!(reasons.len(), 5);
    assert_eq!(reasons[0], "word_count 0 < min_words 40");
    assert!(reasons.iter().any(|r| r.starts_with("citation_count 0 < min_citations")));
    assert!(reasons.iter().any(|r| r.starts_with("support_rate")));
    assert!(reasons.iter().any(|r| r.starts_with("novelty_jaccard")));
    assert!(reasons.iter().any(|r| r.starts_with("toxicity_ratio")));
}

#[test]
fn test_bounds_are_inclusive() {
    let t = lenient();
    let metrics = TurnMetrics {
        support_rate: t.min_support_rate,
        citation_count: t.max_citations,
        word_count: t.min_words,
        novelty_jaccard: t.max_novelty_jaccard,
        toxicity_ratio: t.max_toxicity_ratio,
    };
    assert!(metrics.failures(&t).is_empty());
}

// ==================== thresholds ====================

#[test]
fn test_load_thresholds_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("thresholds.json");
    fs::write(
        &path,
        r#"{"min_words": 3, "max_words": 100, "min_citations": 1, "max_citations": 4,
            "min_support_rate": 0.5, "max_novelty_jaccard": 0.8, "max_toxicity_ratio": 0.1,
            "denylist": ["Stultus"]}"#,
    )
    .expect("write");

    let config = GateConfig::load(&path).expect("load");
    assert_eq!(config.thresholds, lenient());
    assert!(config.denylist.contains("stultus"));
}

#[test]
fn test_missing_threshold_key_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("thresholds.json");
    fs::write(
        &path,
        r#"{"min_words": 3, "max_words": 100, "min_citations": 1, "max_citations": 4,
            "max_novelty_jaccard": 0.8, "max_toxicity_ratio": 0.1}"#,
    )
    .expect("write");

    match GateConfig::load(&path) {
        Err(ConfigError::MissingThreshold { key, .. }) => assert_eq!(key, "min_support_rate"),
        other => panic!("expected MissingThreshold, got {other:?}"),
    }
}

#[test]
fn test_missing_thresholds_file() {
    let dir = TempDir::new().expect("tempdir");
    let err = GateConfig::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { .. }));
}

#[test]
fn test_inverted_bounds_rejected() {
    let mut t = lenient();
    t.min_words = 200;
    assert!(matches!(t.validate(), Err(ConfigError::InvalidThreshold { .. })));

    let mut t = lenient();
    t.min_support_rate = 1.5;
    assert!(matches!(t.validate(), Err(ConfigError::InvalidThreshold { .. })));
}

// ==================== gate ====================

#[test]
fn test_first_pass_accepts_without_retry() {
    let (mut gate, queue, _dir) = queued_gate(lenient());
    let turn = cited("t1", "gratia non tollit naturam sed perficit");

    let decision = gate.process(&turn, &audit_with_rate("t1", 1.0)).expect("process");

    assert!(decision.passed);
    assert_eq!(decision.state, GateState::Accepted);
    assert!(!decision.retried);
    assert!(decision.retry_metrics.is_none());
    assert!(decision.reasons.is_empty());
    assert_eq!(gate.pool().len(), 1);

    assert!(queue.path(Bucket::Accepted, "t1").is_file());
    assert!(!queue.path(Bucket::Rejected, "t1").exists());
    assert!(!queue.path(Bucket::Review, "t1").exists());
}

#[test]
fn test_double_failure_lands_in_rejected_and_review() {
    let (mut gate, queue, _dir) = queued_gate(lenient());
    let turn = cited("t2", "gratia non tollit naturam sed perficit");

    let decision = gate.process(&turn, &audit_with_rate("t2", 0.0)).expect("process");

    assert!(!decision.passed);
    assert!(decision.retried);
    assert_eq!(decision.retry_passed, Some(false));
    assert_eq!(decision.state, GateState::Rejected);
    assert!(decision.state.is_terminal());
    assert!(gate.pool().is_empty());

    assert!(!queue.path(Bucket::Accepted, "t2").exists());
    let rejected: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(queue.path(Bucket::Rejected, "t2")).expect("read"))
            .expect("json");
    assert_eq!(rejected["state"], "rejected");
    assert_eq!(rejected["turn_id"], "t2");
    assert_eq!(rejected["text"], "gratia non tollit naturam sed perficit");
    assert!(queue.path(Bucket::Review, "t2").is_file());
}

#[test]
fn test_zero_claim_turn_is_rejected_under_default_profile() {
    let (mut gate, _queue, _dir) = queued_gate(GateThresholds::default());
    let turn = Turn::new("t0", "");

    let decision = gate.process(&turn, &AuditRecord::new("t0", Vec::new(), None)).expect("process");

    assert_eq!(decision.state, GateState::Rejected);
    assert_eq!(decision.metrics.support_rate, 0.0);
    assert!(decision.reasons.iter().any(|r| r.starts_with("support_rate")));
}

#[test]
fn test_duplicate_text_fails_novelty() {
    let (mut gate, _queue, _dir) = queued_gate(lenient());
    let text = "gratia non tollit naturam sed perficit";

    let first = gate.process(&cited("a", text), &audit_with_rate("a", 1.0)).expect("first");
    let second = gate.process(&cited("b", text), &audit_with_rate("b", 1.0)).expect("second");

    assert_eq!(first.state, GateState::Accepted);
    assert_eq!(first.metrics.novelty_jaccard, 0.0);
    assert_eq!(second.metrics.novelty_jaccard, 1.0);
    assert_eq!(second.state, GateState::Rejected);
    assert!(second.reasons.iter().any(|r| r.starts_with("novelty_jaccard")));
    assert_eq!(gate.pool().len(), 1);
}

#[test]
fn test_retry_with_revised_text_accepts() {
    let retry = Arc::new(RewriteRetry {
        text: "homo est animal rationale et sociale".to_string(),
        calls: AtomicUsize::new(0),
    });
    let (gate, queue, _dir) = queued_gate(lenient());
    let mut gate = gate.with_retry(retry.clone());

    let decision = gate
        .process(&cited("t3", "luna caseus est"), &audit_with_rate("t3", 0.0))
        .expect("process");

    assert_eq!(retry.calls.load(Ordering::SeqCst), 1);
    assert!(!decision.passed);
    assert!(decision.retried);
    assert_eq!(decision.retry_passed, Some(true));
    assert_eq!(decision.state, GateState::Accepted);
    assert_eq!(decision.final_metrics().support_rate, 1.0);
    assert_eq!(gate.pool().len(), 1);

    let routed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(queue.path(Bucket::Accepted, "t3")).expect("read"))
            .expect("json");
    assert_eq!(routed["text"], "homo est animal rationale et sociale");
    assert_eq!(routed["passed"], false);
}

#[test]
fn test_retry_error_rejects() {
    let (gate, _queue, _dir) = queued_gate(lenient());
    let mut gate = gate.with_retry(Arc::new(BrokenRetry));

    let decision = gate
        .process(&cited("t4", "luna caseus est"), &audit_with_rate("t4", 0.0))
        .expect("process");

    assert_eq!(decision.state, GateState::Rejected);
    assert_eq!(decision.retry_passed, Some(false));
    assert!(decision.retry_metrics.is_none());
    assert_eq!(decision.retry_reasons, vec!["retry failed: generator offline".to_string()]);
}

#[test]
fn test_rerouting_removes_stale_entries() {
    let (mut gate, queue, dir) = queued_gate(lenient());
    let turn = cited("t5", "gratia non tollit naturam sed perficit");
    gate.process(&turn, &audit_with_rate("t5", 0.0)).expect("reject");
    assert!(queue.path(Bucket::Review, "t5").is_file());

    // A fresh gate over the same batch, now with a passing audit.
    let layout = BatchLayout::new(dir.path(), "b1");
    let mut regate = QualityGate::new(GateConfig::new(lenient())).with_queue(QueueWriter::new(&layout));
    regate.process(&turn, &audit_with_rate("t5", 1.0)).expect("accept");

    assert!(queue.path(Bucket::Accepted, "t5").is_file());
    assert!(!queue.path(Bucket::Rejected, "t5").exists());
    assert!(!queue.path(Bucket::Review, "t5").exists());
}

#[test]
fn test_routing_failure_leaves_pool_and_counters_untouched() {
    let dir = TempDir::new().expect("tempdir");
    let layout = BatchLayout::new(dir.path(), "b1");
    fs::create_dir_all(layout.root()).expect("root");
    // A plain file where the accepted bucket directory should be.
    fs::write(layout.accepted(), "not a directory").expect("write");
    let mut gate = QualityGate::new(GateConfig::new(lenient())).with_queue(QueueWriter::new(&layout));

    let result = gate.process(&cited("t7", "gratia non tollit naturam"), &audit_with_rate("t7", 1.0));

    assert!(matches!(result, Err(GateError::Storage(_))));
    assert!(gate.pool().is_empty());
    assert_eq!(gate.counters().turns_total(), 0);

    // The same text still counts as novel once routing works again.
    fs::remove_file(layout.accepted()).expect("remove");
    let decision = gate
        .process(&cited("t7", "gratia non tollit naturam"), &audit_with_rate("t7", 1.0))
        .expect("process");
    assert_eq!(decision.metrics.novelty_jaccard, 0.0);
    assert!(decision.accepted());
    assert_eq!(gate.pool().len(), 1);
}

#[test]
fn test_gate_without_queue_writes_nothing() {
    let mut gate = QualityGate::new(GateConfig::new(lenient()));
    let decision = gate
        .process(&cited("t6", "gratia non tollit naturam"), &audit_with_rate("t6", 1.0))
        .expect("process");
    assert!(decision.accepted());
}

// ==================== counters ====================

#[test]
fn test_counters_and_summary() {
    let (mut gate, _queue, _dir) = queued_gate(lenient());
    gate.process(&cited("a", "gratia non tollit naturam"), &audit_with_rate("a", 1.0))
        .expect("a");
    gate.process(&cited("b", "luna caseus est"), &audit_with_rate("b", 0.0))
        .expect("b");
    gate.counters().record_skipped(2);

    let summary = gate.summary("b1");
    assert_eq!(summary.batch_id, "b1");
    assert_eq!(summary.turns_total, 2);
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.review, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.accepted + summary.rejected, summary.turns_total);
    assert!((summary.kpis.support_rate_avg - 0.5).abs() < 1e-12);
    assert!((summary.kpis.citations_avg - 1.0).abs() < 1e-12);
    assert!(summary.started_at <= summary.finalized_at);
}

#[test]
fn test_empty_summary_has_zero_kpis() {
    let summary = RunCounters::new().finalize("empty");
    assert_eq!(summary.turns_total, 0);
    assert_eq!(summary.kpis, Kpis::default());
}

#[test]
fn test_bucket_targets() {
    assert_eq!(Bucket::targets(GateState::Accepted), &[Bucket::Accepted]);
    assert_eq!(Bucket::targets(GateState::Rejected), &[Bucket::Rejected, Bucket::Review]);
}
