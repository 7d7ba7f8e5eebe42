//! Runtime settings for indexing, auditing and gating.
//!
//! Most settings have defaults. Override with `TURNGATE_*` environment
//! variables; CLI flags override both. Gate thresholds are not read from the
//! environment: they come from a JSON file (see [`crate::gate::GateConfig`]).

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;

use crate::constants::{DEFAULT_DENSE_K, DEFAULT_EVIDENCE_PER_CLAIM, DEFAULT_LEXICAL_K, DEFAULT_TOP_K};
use crate::retrieval::{FusionPolicy, SearchParams};

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root of per-batch run directories. Default: `runs`.
    pub runs_dir: PathBuf,

    /// Directory holding the persisted index and `corpus.jsonl`. Default: `indices`.
    pub indices_dir: PathBuf,

    /// Batch to operate on.
    pub batch_id: Option<String>,

    /// Fusion policy for hybrid search. Default: `rrf`.
    pub fusion: FusionPolicy,

    pub lexical_k: usize,
    pub dense_k: usize,
    pub top_k: usize,

    /// Evidence items retrieved per claim. Default: `6`.
    pub evidence_per_claim: usize,

    /// Rerank the fused candidate pool when a reranker is available.
    pub rerank: bool,

    /// Gate thresholds JSON file. Required by the `gate` and `run` commands.
    pub thresholds_path: Option<PathBuf>,

    /// Maximum audits in flight. Default: available parallelism.
    pub audit_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runs_dir: PathBuf::from("runs"),
            indices_dir: PathBuf::from("indices"),
            batch_id: None,
            fusion: FusionPolicy::default(),
            lexical_k: DEFAULT_LEXICAL_K,
            dense_k: DEFAULT_DENSE_K,
            top_k: DEFAULT_TOP_K,
            evidence_per_claim: DEFAULT_EVIDENCE_PER_CLAIM,
            rerank: false,
            thresholds_path: None,
            audit_concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl Config {
    pub const ENV_RUNS_DIR: &'static str = "TURNGATE_RUNS_DIR";
    pub const ENV_INDICES_DIR: &'static str = "TURNGATE_INDICES_DIR";
    pub const ENV_BATCH_ID: &'static str = "TURNGATE_BATCH_ID";
    pub const ENV_FUSION: &'static str = "TURNGATE_FUSION";
    pub const ENV_LEXICAL_K: &'static str = "TURNGATE_LEXICAL_K";
    pub const ENV_DENSE_K: &'static str = "TURNGATE_DENSE_K";
    pub const ENV_TOP_K: &'static str = "TURNGATE_TOP_K";
    pub const ENV_EVIDENCE_PER_CLAIM: &'static str = "TURNGATE_EVIDENCE_PER_CLAIM";
    pub const ENV_RERANK: &'static str = "TURNGATE_RERANK";
    pub const ENV_THRESHOLDS_PATH: &'static str = "TURNGATE_THRESHOLDS_PATH";
    pub const ENV_AUDIT_CONCURRENCY: &'static str = "TURNGATE_AUDIT_CONCURRENCY";

    /// Reads every `TURNGATE_*` variable; unset ones keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            runs_dir: Self::parse_path_from_env(Self::ENV_RUNS_DIR, defaults.runs_dir),
            indices_dir: Self::parse_path_from_env(Self::ENV_INDICES_DIR, defaults.indices_dir),
            batch_id: Self::parse_optional_string_from_env(Self::ENV_BATCH_ID),
            fusion: Self::parse_fusion_from_env(defaults.fusion)?,
            lexical_k: Self::parse_usize_from_env(Self::ENV_LEXICAL_K, defaults.lexical_k)?,
            dense_k: Self::parse_usize_from_env(Self::ENV_DENSE_K, defaults.dense_k)?,
            top_k: Self::parse_usize_from_env(Self::ENV_TOP_K, defaults.top_k)?,
            evidence_per_claim: Self::parse_usize_from_env(
                Self::ENV_EVIDENCE_PER_CLAIM,
                defaults.evidence_per_claim,
            )?,
            rerank: Self::parse_bool_from_env(Self::ENV_RERANK, defaults.rerank)?,
            thresholds_path: Self::parse_optional_path_from_env(Self::ENV_THRESHOLDS_PATH),
            audit_concurrency: Self::parse_usize_from_env(
                Self::ENV_AUDIT_CONCURRENCY,
                defaults.audit_concurrency,
            )?,
        })
    }

    /// Checks directory kinds, the thresholds file and non-zero sizes. Creates nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runs_dir.exists() && !self.runs_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.runs_dir.clone(),
            });
        }
        if self.indices_dir.exists() && !self.indices_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.indices_dir.clone(),
            });
        }

        if let Some(ref path) = self.thresholds_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        for (name, value) in [
            (Self::ENV_LEXICAL_K, self.lexical_k),
            (Self::ENV_TOP_K, self.top_k),
            (Self::ENV_EVIDENCE_PER_CLAIM, self.evidence_per_claim),
            (Self::ENV_AUDIT_CONCURRENCY, self.audit_concurrency),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: value.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }

    /// The batch id, or [`ConfigError::MissingBatchId`].
    pub fn require_batch_id(&self) -> Result<&str, ConfigError> {
        self.batch_id.as_deref().ok_or(ConfigError::MissingBatchId)
    }

    /// Search parameters for a general query.
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            lexical_k: self.lexical_k,
            dense_k: self.dense_k,
            top_k: self.top_k,
            rerank: self.rerank,
            ..SearchParams::default()
        }
    }

    fn parse_fusion_from_env(default: FusionPolicy) -> Result<FusionPolicy, ConfigError> {
        match env::var(Self::ENV_FUSION) {
            Ok(value) => value.parse().map_err(|e: crate::retrieval::RetrievalError| {
                ConfigError::InvalidValue {
                    name: Self::ENV_FUSION,
                    value,
                    reason: e.to_string(),
                }
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_usize_from_env(var_name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                    name: var_name,
                    value,
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" | "" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    name: var_name,
                    value,
                    reason: "expected true/false".to_string(),
                }),
            },
            Err(_) => Ok(default),
        }
    }
}
