use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use super::*;
use crate::audit::{AuditBuilder, audit_path, read_audit, write_audit};
use crate::corpus::{ChunkingConfig, IndexStore, SourceText};
use crate::embedding::ScorerContext;
use crate::embedding::stub::OverlapEntailmentScorer;
use crate::gate::{GateConfig, GateThresholds, QualityGate};
use crate::retrieval::HybridRetriever;
use crate::storage::StorageError;

fn write_turn(dir: &Path, name: &str, body: &str) {
    fs::create_dir_all(dir).expect("mkdir");
    fs::write(dir.join(name), body).expect("write turn");
}

fn builder() -> Arc<AuditBuilder> {
    let sources = vec![
        SourceText::new("summa.txt", "Gratia non tollit naturam sed perficit"),
        SourceText::new("ethica.txt", "Homo est animal rationale"),
    ];
    let store = IndexStore::build(&sources, &ChunkingConfig::default(), None).expect("build");
    let scorers = ScorerContext::empty().with_entailment(Arc::new(OverlapEntailmentScorer));
    Arc::new(AuditBuilder::new(Arc::new(HybridRetriever::new(Arc::new(store), scorers))))
}

fn short_thresholds() -> GateThresholds {
    GateThresholds {
        min_words: 3,
        max_words: 100,
        min_citations: 0,
        max_citations: 4,
        min_support_rate: 0.5,
        max_novelty_jaccard: 0.8,
        max_toxicity_ratio: 0.1,
    }
}

// ==================== turn parsing ====================

#[test]
fn test_turn_from_json_fallbacks() {
    let turn = Turn::from_json(
        br#"{"response": "Homo est animal rationale.", "meta": {"citations": [{"work": "Ethica", "ref": "I"}]}}"#,
        "t-file",
    )
    .expect("parse");
    assert_eq!(turn.id, "t-file");
    assert_eq!(turn.text, "Homo est animal rationale.");
    assert_eq!(turn.citations, vec![Citation::new("Ethica", "I")]);

    let turn = Turn::from_json(br#"{"id": "t2", "text": "Gratia", "response": ""}"#, "t-file")
        .expect("parse");
    assert_eq!(turn.text, "Gratia");
}

#[test]
fn test_turn_response_preferred_over_text() {
    let turn = Turn::from_json(
        br#"{"id": "t1", "text": "draft prompt echo", "response": "Homo est animal rationale."}"#,
        "t-file",
    )
    .expect("parse");
    assert_eq!(turn.text, "Homo est animal rationale.");
}

#[test]
fn test_turn_top_level_citations_win() {
    let turn = Turn::from_json(
        br#"{"id": "t9", "text": "x", "citations": [{"work": "A", "ref": "1"}],
             "meta": {"citations": [{"work": "B", "ref": "2"}]}}"#,
        "ignored",
    )
    .expect("parse");
    assert_eq!(turn.id, "t9");
    assert_eq!(turn.citations[0].work, "A");
}

#[test]
fn test_turn_file_stem_encodes_separators() {
    assert_eq!(turn_file_stem("a/b\\c:d"), "a%2Fb%5Cc%3Ad");
    assert_eq!(turn_file_stem("50%"), "50%25");
    assert_eq!(turn_file_stem("plain-id_1.x"), "plain-id_1.x");
}

#[test]
fn test_turn_file_stem_is_injective() {
    let ids = ["a/b", "a_b", "a%2Fb", "a:b", "a\\b"];
    let stems: std::collections::HashSet<_> = ids.iter().map(|id| turn_file_stem(id)).collect();
    assert_eq!(stems.len(), ids.len());
}

#[test]
fn test_layout_paths() {
    let layout = BatchLayout::new(Path::new("runs"), "b7");
    assert_eq!(layout.root(), Path::new("runs/b7"));
    assert_eq!(layout.generated(), Path::new("runs/b7/generated"));
    assert_eq!(layout.summary_path(), Path::new("runs/b7/summary.json"));
}

// ==================== loader ====================

#[test]
fn test_load_turns_sorts_and_skips() {
    let dir = TempDir::new().expect("tempdir");
    let generated = dir.path().join("generated");
    write_turn(&generated, "b.json", r#"{"id": "b", "text": "secunda"}"#);
    write_turn(&generated, "a.json", r#"{"id": "a", "text": "prima"}"#);
    write_turn(&generated, "broken.json", "{not json");
    write_turn(&generated, "dup.json", r#"{"id": "a", "text": "iterum"}"#);
    write_turn(&generated, "notes.txt", "ignored");

    let loaded = load_turns(&generated).expect("load");
    let ids: Vec<_> = loaded.turns.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(loaded.turns[0].text, "prima");
    assert_eq!(loaded.skipped, 2);
    assert!(loaded.turns[0].source_path.is_some());
}

#[test]
fn test_unreadable_files_are_skippable() {
    let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
    let err = BatchError::Storage(StorageError::io("generated/t1.json", denied));
    assert!(err.is_skippable());

    let err = BatchError::MissingGenerated { path: "generated".into() };
    assert!(!err.is_skippable());
}

#[test]
fn test_load_turns_missing_dir() {
    let dir = TempDir::new().expect("tempdir");
    let err = load_turns(&dir.path().join("generated")).unwrap_err();
    assert!(matches!(err, BatchError::MissingGenerated { .. }));
}

// ==================== runner ====================

#[tokio::test]
async fn test_audit_writes_one_record_per_turn() {
    let dir = TempDir::new().expect("tempdir");
    let layout = BatchLayout::new(dir.path(), "b1");
    write_turn(&layout.generated(), "t1.json", r#"{"id": "t1", "text": "Homo est animal rationale."}"#);
    write_turn(&layout.generated(), "t2.json", r#"{"id": "t2", "text": ""}"#);

    let runner = BatchRunner::new(layout.clone()).with_concurrency(2);
    let report = runner.audit(builder()).await.expect("audit");

    assert_eq!(report.audited, 2);
    assert_eq!(report.claims, 1);
    assert_eq!(report.supported, 1);
    assert!(audit_path(&layout.audits(), "t1").is_file());
    assert_eq!(read_audit(&layout.audits(), "t2").expect("t2").support_rate, 0.0);
}

#[tokio::test]
async fn test_run_routes_and_summarizes() {
    let dir = TempDir::new().expect("tempdir");
    let layout = BatchLayout::new(dir.path(), "b2");
    write_turn(
        &layout.generated(),
        "t1.json",
        r#"{"id": "t1", "text": "Homo est animal rationale."}"#,
    );
    write_turn(
        &layout.generated(),
        "t2.json",
        r#"{"id": "t2", "text": "Homo est animal rationale."}"#,
    );
    write_turn(&layout.generated(), "t3.json", r#"{"id": "t3", "text": "Luna est caseus viridis."}"#);

    let gate = QualityGate::new(GateConfig::new(short_thresholds()));
    let summary = BatchRunner::new(layout.clone())
        .run(builder(), gate)
        .await
        .expect("run");

    assert_eq!(summary.turns_total, 3);
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.rejected, 2);
    assert_eq!(summary.review, 2);
    assert_eq!(summary.skipped, 0);
    assert!(layout.accepted().join("t1.json").is_file());
    // Same text as t1, gated after it: rejected on novelty.
    assert!(layout.rejected().join("t2.json").is_file());
    assert!(layout.review().join("t3.json").is_file());

    let on_disk: crate::gate::RunSummary =
        serde_json::from_str(&fs::read_to_string(layout.summary_path()).expect("summary")).expect("json");
    assert_eq!(on_disk.batch_id, "b2");
    assert_eq!(on_disk.turns_total, summary.turns_total);
    assert_eq!(on_disk.accepted, summary.accepted);
    assert!((on_disk.kpis.support_rate_avg - summary.kpis.support_rate_avg).abs() < 1e-9);
}

#[test]
fn test_gate_skips_turns_without_audit() {
    let dir = TempDir::new().expect("tempdir");
    let layout = BatchLayout::new(dir.path(), "b3");
    write_turn(&layout.generated(), "t1.json", r#"{"id": "t1", "text": "Homo est animal."}"#);
    layout.ensure_output_dirs().expect("dirs");
    fs::write(audit_path(&layout.audits(), "t1"), "{oops").expect("write");

    let gate = QualityGate::new(GateConfig::new(short_thresholds()));
    let summary = BatchRunner::new(layout).gate(gate).expect("gate");
    assert_eq!(summary.turns_total, 0);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn test_gate_skips_unreadable_audit_and_continues() {
    let dir = TempDir::new().expect("tempdir");
    let layout = BatchLayout::new(dir.path(), "b4");
    write_turn(&layout.generated(), "t1.json", r#"{"id": "t1", "text": "Homo est animal."}"#);
    write_turn(&layout.generated(), "t2.json", r#"{"id": "t2", "text": "Gratia perficit naturam."}"#);
    layout.ensure_output_dirs().expect("dirs");
    // Reading a directory fails with an I/O error other than NotFound.
    fs::create_dir(audit_path(&layout.audits(), "t1")).expect("mkdir");
    let audit = builder().audit_turn(&Turn::new("t2", "Gratia perficit naturam."));
    write_audit(&layout.audits(), &audit, false).expect("write audit");

    let gate = QualityGate::new(GateConfig::new(short_thresholds()));
    let summary = BatchRunner::new(layout.clone()).gate(gate).expect("gate");
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.turns_total, 1);
    assert!(layout.summary_path().is_file());
}

#[tokio::test]
async fn test_run_keeps_ids_that_differ_only_by_separator() {
    let dir = TempDir::new().expect("tempdir");
    let layout = BatchLayout::new(dir.path(), "b5");
    write_turn(&layout.generated(), "slash.json", r#"{"id": "a/b", "text": "Homo est animal rationale."}"#);
    write_turn(&layout.generated(), "under.json", r#"{"id": "a_b", "text": "Gratia non tollit naturam."}"#);

    let gate = QualityGate::new(GateConfig::new(short_thresholds()));
    let summary = BatchRunner::new(layout.clone())
        .run(builder(), gate)
        .await
        .expect("run");

    assert_eq!(summary.turns_total, 2);
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.skipped, 0);
    assert_ne!(audit_path(&layout.audits(), "a/b"), audit_path(&layout.audits(), "a_b"));
    assert_eq!(read_audit(&layout.audits(), "a/b").expect("a/b").turn_id, "a/b");
    assert_eq!(read_audit(&layout.audits(), "a_b").expect("a_b").turn_id, "a_b");
    assert!(layout.accepted().join("a%2Fb.json").is_file());
    assert!(layout.accepted().join("a_b.json").is_file());
}
