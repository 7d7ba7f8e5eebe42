//! End-to-end tests: index on disk, audit, gate.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use turngate::audit::{AuditBuilder, read_audit};
use turngate::batch::{BatchLayout, BatchRunner};
use turngate::corpus::{ChunkingConfig, IndexStore, SourceText};
use turngate::embedding::ScorerContext;
use turngate::embedding::stub::{HashingEmbedder, OverlapEntailmentScorer};
use turngate::gate::{GateConfig, GateState, GateThresholds, QualityGate};
use turngate::retrieval::{HybridRetriever, SearchParams};

const THRESHOLDS: &str = r#"{
    "min_words": 40, "max_words": 400,
    "min_citations": 1, "max_citations": 8,
    "min_support_rate": 0.6, "max_novelty_jaccard": 0.8,
    "max_toxicity_ratio": 0.01
}"#;

fn latin_sources() -> Vec<SourceText> {
    vec![
        SourceText::new("summa.txt", "Gratia non tollit naturam"),
        SourceText::new("ethica.txt", "Homo est animal rationale"),
    ]
}

fn write_json(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, body).expect("write");
}

fn persisted_retriever(dir: &Path, scorers: ScorerContext) -> HybridRetriever {
    let embedder = scorers.embedder().cloned();
    let store = IndexStore::build(
        &latin_sources(),
        &ChunkingConfig::default(),
        embedder.as_deref(),
    )
    .expect("build");
    store.save(dir).expect("save");

    let loaded = IndexStore::load(dir).expect("load");
    HybridRetriever::new(Arc::new(loaded), scorers)
}

#[test]
fn test_latin_lexical_top1_after_reload() {
    let dir = TempDir::new().expect("tempdir");
    let retriever = persisted_retriever(dir.path(), ScorerContext::empty());
    assert!(!retriever.dense_enabled());

    let hits = retriever
        .search("gratia naturam", &SearchParams::default().with_top_k(1))
        .expect("search");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].chunk.text, "Gratia non tollit naturam");
    assert_eq!(hits[0].lexical_rank, Some(1));
    assert!(hits[0].dense_score.is_none());
}

#[test]
fn test_latin_hybrid_top1_with_stub_embedder() {
    let dir = TempDir::new().expect("tempdir");
    let embedder = Arc::new(HashingEmbedder::new(64).expect("embedder"));
    let retriever = persisted_retriever(dir.path(), ScorerContext::empty().with_embedder(embedder));
    assert!(retriever.dense_enabled());

    let hits = retriever
        .search("gratia naturam", &SearchParams::default().with_top_k(1))
        .expect("search");
    assert_eq!(hits[0].chunk.source_ref, "summa.txt");
}

#[tokio::test]
async fn test_batch_run_end_to_end() {
    let dir = TempDir::new().expect("tempdir");
    let indices = dir.path().join("indices");
    let scorers = ScorerContext::empty().with_entailment(Arc::new(OverlapEntailmentScorer));
    let retriever = persisted_retriever(&indices, scorers);

    let layout = BatchLayout::new(&dir.path().join("runs"), "latin");
    let long_text = "Homo est animal rationale. ".repeat(12);
    write_json(
        &layout.generated().join("t1.json"),
        &serde_json::json!({
            "id": "t1",
            "text": long_text,
            "citations": [{"work": "Ethica", "ref": "I"}]
        })
        .to_string(),
    );
    write_json(
        &layout.generated().join("t2.json"),
        &serde_json::json!({
            "id": "t2",
            "response": long_text,
            "meta": {"citations": [{"work": "Ethica", "ref": "I"}]}
        })
        .to_string(),
    );
    write_json(&layout.generated().join("t0.json"), r#"{"id": "t0", "text": ""}"#);
    write_json(&layout.generated().join("junk.json"), "[1, 2");

    let thresholds_path = dir.path().join("thresholds.json");
    write_json(&thresholds_path, THRESHOLDS);
    let gate_config = GateConfig::load(&thresholds_path).expect("thresholds");
    assert_eq!(gate_config.thresholds, GateThresholds::default());

    let builder = Arc::new(AuditBuilder::new(Arc::new(retriever)));
    let summary = BatchRunner::new(layout.clone())
        .with_concurrency(2)
        .run(builder, QualityGate::new(gate_config))
        .await
        .expect("run");

    // t0: no claims, no words, no citations.
    let zero = read_audit(&layout.audits(), "t0").expect("t0 audit");
    assert!(zero.claims.is_empty());
    assert_eq!(zero.support_rate, 0.0);
    assert!(layout.rejected().join("t0.json").is_file());
    assert!(layout.review().join("t0.json").is_file());

    // t1 is gated before t2 and accepted; t2 repeats it.
    let t1 = read_audit(&layout.audits(), "t1").expect("t1 audit");
    assert_eq!(t1.support_rate, 1.0);
    assert!(layout.accepted().join("t1.json").is_file());

    let t2: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(layout.rejected().join("t2.json")).expect("t2 decision"),
    )
    .expect("json");
    assert_eq!(t2["state"], GateState::Rejected.to_string());
    assert_eq!(t2["metrics"]["novelty_jaccard"], 1.0);
    assert_eq!(t2["retried"], true);
    assert!(layout.review().join("t2.json").is_file());

    assert_eq!(summary.turns_total, 3);
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.rejected, 2);
    assert_eq!(summary.review, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.kpis.novelty_max, 1.0);
    assert!(layout.summary_path().is_file());
}

#[tokio::test]
async fn test_regate_is_idempotent() {
    let dir = TempDir::new().expect("tempdir");
    let indices = dir.path().join("indices");
    let scorers = ScorerContext::empty().with_entailment(Arc::new(OverlapEntailmentScorer));
    let retriever = persisted_retriever(&indices, scorers);

    let layout = BatchLayout::new(&dir.path().join("runs"), "again");
    write_json(
        &layout.generated().join("t1.json"),
        r#"{"id": "t1", "text": "Gratia non tollit naturam.", "citations": [{"work": "Summa", "ref": "I"}]}"#,
    );
    let runner = BatchRunner::new(layout.clone());
    runner
        .audit(Arc::new(AuditBuilder::new(Arc::new(retriever))))
        .await
        .expect("audit");

    let strict = GateThresholds::default();
    let first = runner.gate(QualityGate::new(GateConfig::new(strict))).expect("first");
    assert_eq!(first.rejected, 1);
    assert!(layout.review().join("t1.json").is_file());

    let lenient = GateThresholds {
        min_words: 1,
        ..GateThresholds::default()
    };
    let second = runner.gate(QualityGate::new(GateConfig::new(lenient))).expect("second");
    assert_eq!(second.accepted, 1);
    assert!(layout.accepted().join("t1.json").is_file());
    assert!(!layout.rejected().join("t1.json").exists());
    assert!(!layout.review().join("t1.json").exists());
}
