//! Turngate command-line entrypoint.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mimalloc::MiMalloc;
use serde::Serialize;

use turngate::audit::{AuditBuilder, AuditConfig};
use turngate::batch::{BatchLayout, BatchRunner};
use turngate::config::Config;
use turngate::constants::DEFAULT_STUB_EMBEDDING_DIM;
use turngate::corpus::{
    ChunkingConfig, IndexStore, SourceText, read_corpus_jsonl, read_text_sources,
};
use turngate::embedding::ScorerContext;
use turngate::embedding::stub::{HashingEmbedder, OverlapEntailmentScorer, OverlapReranker};
use turngate::gate::{GateConfig, QualityGate};
use turngate::retrieval::{FusionPolicy, HybridRetriever};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const CORPUS_JSONL: &str = "corpus.jsonl";

#[derive(Parser, Debug)]
#[command(name = "turngate", version, about = "Evidence-grounded audit and quality gate for generated turns")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Command,
}

/// Overrides for `TURNGATE_*` environment settings.
#[derive(Args, Debug)]
struct CommonArgs {
    #[arg(long, global = true)]
    runs_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    indices_dir: Option<PathBuf>,
    #[arg(long = "batch", global = true)]
    batch_id: Option<String>,
}

#[derive(Args, Debug, Default)]
struct ScorerArgs {
    /// Use the deterministic hashing embedder for the dense stage.
    #[arg(long)]
    stub_embedder: bool,
    #[arg(long, default_value_t = DEFAULT_STUB_EMBEDDING_DIM)]
    embedding_dim: usize,
}

#[derive(Args, Debug)]
struct AuditArgs {
    #[command(flatten)]
    scorers: ScorerArgs,
    #[arg(long, value_enum, default_value_t = NliBackend::Overlap)]
    nli: NliBackend,
    #[arg(long)]
    fusion: Option<FusionPolicy>,
    /// Rerank the fused candidate pool with the overlap reranker.
    #[arg(long)]
    rerank: bool,
    #[arg(long)]
    evidence_per_claim: Option<usize>,
    /// Also write one file per claim next to each audit.
    #[arg(long)]
    claim_files: bool,
    #[arg(long)]
    concurrency: Option<usize>,
}

#[derive(Args, Debug)]
struct GateArgs {
    #[arg(long)]
    thresholds: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum NliBackend {
    /// Lexical-overlap entailment stand-in.
    Overlap,
    /// No scorer: every claim is `uncertain`.
    None,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chunk a corpus and persist the index.
    Index {
        /// `corpus.jsonl` or a directory of `.txt` / `.md` files.
        /// Default: `<indices_dir>/corpus.jsonl`.
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Tokens per chunk. Default: 160.
        #[arg(long)]
        window: Option<usize>,
        /// Tokens shared by consecutive chunks.
        #[arg(long, default_value_t = 0)]
        overlap: usize,
        #[command(flatten)]
        scorers: ScorerArgs,
    },
    /// Print the evidence retrieved for a query.
    Search {
        query: String,
        #[arg(long)]
        top_k: Option<usize>,
        #[command(flatten)]
        audit: AuditArgs,
    },
    /// Audit every generated turn of a batch.
    Audit(AuditArgs),
    /// Gate audited turns into accepted / rejected / review.
    Gate(GateArgs),
    /// Audit, then gate.
    Run {
        #[command(flatten)]
        audit: AuditArgs,
        #[command(flatten)]
        gate: GateArgs,
    },
}

#[derive(Serialize)]
struct SearchHit<'a> {
    chunk_id: &'a str,
    source_ref: &'a str,
    score: f64,
    fused_score: f64,
    lexical_rank: Option<usize>,
    dense_rank: Option<usize>,
    text: &'a str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.common.runs_dir {
        config.runs_dir = dir;
    }
    if let Some(dir) = cli.common.indices_dir {
        config.indices_dir = dir;
    }
    if let Some(batch_id) = cli.common.batch_id {
        config.batch_id = Some(batch_id);
    }

    match cli.command {
        Command::Index {
            corpus,
            window,
            overlap,
            scorers,
        } => {
            config.validate()?;
            let chunking = ChunkingConfig::tokens(window, overlap);
            chunking.validate()?;
            run_index(&config, corpus, chunking, &scorers)
        }
        Command::Search { query, top_k, audit } => {
            apply_audit_args(&mut config, &audit);
            config.validate()?;
            let retriever = build_retriever(&config, &audit)?;
            let mut params = config.search_params();
            if let Some(k) = top_k {
                params = params.with_top_k(k);
            }
            let hits = retriever.search(&query, &params)?;
            let rows: Vec<_> = hits
                .iter()
                .map(|hit| SearchHit {
                    chunk_id: &hit.chunk.id,
                    source_ref: &hit.chunk.source_ref,
                    score: hit.score(),
                    fused_score: hit.fused_score,
                    lexical_rank: hit.lexical_rank,
                    dense_rank: hit.dense_rank,
                    text: &hit.chunk.text,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            Ok(())
        }
        Command::Audit(audit) => {
            apply_audit_args(&mut config, &audit);
            config.validate()?;
            let builder = build_auditor(&config, &audit)?;
            let report = runner(&config)?.audit(builder).await?;
            tracing::info!(
                audited = report.audited,
                claims = report.claims,
                supported = report.supported,
                skipped = report.skipped,
                "Audit finished"
            );
            Ok(())
        }
        Command::Gate(gate) => {
            apply_gate_args(&mut config, &gate);
            config.validate()?;
            let gate = load_gate(&config)?;
            let summary = runner(&config)?.gate(gate)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Run { audit, gate } => {
            apply_audit_args(&mut config, &audit);
            apply_gate_args(&mut config, &gate);
            config.validate()?;
            // Setup failures surface before any turn is audited.
            let quality_gate = load_gate(&config)?;
            let builder = build_auditor(&config, &audit)?;
            let summary = runner(&config)?.run(builder, quality_gate).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
    }
}

fn apply_audit_args(config: &mut Config, args: &AuditArgs) {
    if let Some(fusion) = args.fusion {
        config.fusion = fusion;
    }
    if args.rerank {
        config.rerank = true;
    }
    if let Some(n) = args.evidence_per_claim {
        config.evidence_per_claim = n;
    }
    if let Some(n) = args.concurrency {
        config.audit_concurrency = n;
    }
}

fn apply_gate_args(config: &mut Config, args: &GateArgs) {
    if let Some(path) = &args.thresholds {
        config.thresholds_path = Some(path.clone());
    }
}

fn runner(config: &Config) -> anyhow::Result<BatchRunner> {
    let layout = BatchLayout::new(&config.runs_dir, config.require_batch_id()?);
    Ok(BatchRunner::new(layout).with_concurrency(config.audit_concurrency))
}

fn load_gate(config: &Config) -> anyhow::Result<QualityGate> {
    let Some(path) = &config.thresholds_path else {
        bail!(
            "no thresholds file given; pass --thresholds or set {}",
            Config::ENV_THRESHOLDS_PATH
        );
    };
    Ok(QualityGate::new(GateConfig::load(path)?))
}

fn scorer_context(args: &ScorerArgs) -> anyhow::Result<ScorerContext> {
    let mut scorers = ScorerContext::empty();
    if args.stub_embedder {
        scorers = scorers.with_embedder(Arc::new(HashingEmbedder::new(args.embedding_dim)?));
    }
    Ok(scorers)
}

fn build_retriever(config: &Config, args: &AuditArgs) -> anyhow::Result<HybridRetriever> {
    let store = IndexStore::load(&config.indices_dir)
        .with_context(|| format!("loading index from {}", config.indices_dir.display()))?;

    let mut scorers = scorer_context(&args.scorers)?;
    if args.nli == NliBackend::Overlap {
        scorers = scorers.with_entailment(Arc::new(OverlapEntailmentScorer));
    }
    if config.rerank {
        scorers = scorers.with_reranker(Arc::new(OverlapReranker));
    }

    let retriever = HybridRetriever::new(Arc::new(store), scorers).with_fusion(config.fusion);
    tracing::info!(
        fusion = %config.fusion,
        dense = retriever.dense_enabled(),
        rerank = config.rerank,
        "Retriever ready"
    );
    Ok(retriever)
}

fn build_auditor(config: &Config, args: &AuditArgs) -> anyhow::Result<Arc<AuditBuilder>> {
    let retriever = build_retriever(config, args)?;
    let audit_config = AuditConfig {
        evidence_per_claim: config.evidence_per_claim,
        search: config.search_params(),
        write_claim_files: args.claim_files,
    };
    Ok(Arc::new(
        AuditBuilder::new(Arc::new(retriever)).with_config(audit_config),
    ))
}

fn run_index(
    config: &Config,
    corpus: Option<PathBuf>,
    chunking: ChunkingConfig,
    scorers: &ScorerArgs,
) -> anyhow::Result<()> {
    let corpus = corpus.unwrap_or_else(|| config.indices_dir.join(CORPUS_JSONL));
    let sources = read_sources(&corpus)?;

    let context = scorer_context(scorers)?;
    let embedder = context.embedder().map(|e| e.as_ref());
    let store = IndexStore::build(&sources, &chunking, embedder)?;
    let meta = store.save(&config.indices_dir)?;

    tracing::info!(
        indices_dir = %config.indices_dir.display(),
        chunks = meta.num_chunks,
        dense = meta.dense.is_some(),
        "Index written"
    );
    Ok(())
}

fn read_sources(corpus: &Path) -> anyhow::Result<Vec<SourceText>> {
    let sources = if corpus.is_dir() {
        read_text_sources(corpus)?
    } else {
        read_corpus_jsonl(corpus)?
    };
    Ok(sources)
}
