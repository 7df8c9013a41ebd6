//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `COVENANT_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::budget::{BudgetMode, ContextBudgeter};
use crate::constants::{
    DEFAULT_DEFINITIONS_CACHE_CAPACITY, DEFAULT_MAX_CONTEXT_TOKENS, DEFAULT_MAX_KEPT_CHUNKS,
    DEFAULT_MIN_CHUNKS_ABOVE_THRESHOLD, DEFAULT_MIN_RELEVANCE, DEFAULT_RELEVANCE_THRESHOLD,
    DEFAULT_RERANK_CONCURRENCY, DEFAULT_RERANK_MAX_CHARS, DEFAULT_RERANK_TIMEOUT_SECS,
    DEFAULT_RETRIEVAL_MIN_RATIO, DEFAULT_RETRIEVAL_MIN_SCORE,
};
use crate::gate::{RerankedGate, RetrievalGate};
use crate::rerank::RerankerConfig;
use crate::tokenize::TokenCounter;

/// Default Qdrant URL used when `COVENANT_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default Qdrant collection holding corpus chunks.
pub const DEFAULT_COLLECTION: &str = "covenant_chunks";

/// Default model used for rerank scoring and answer generation.
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";

/// Pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `COVENANT_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding persisted keyword indexes. Default: `./.data`.
    pub index_dir: PathBuf,

    /// Licensing provider whose corpus this instance serves. Default: `default`.
    pub provider: String,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Qdrant collection name. Default: `covenant_chunks`.
    pub collection: String,

    /// Model id for scoring and generation. Default: `gpt-4o-mini`.
    pub generation_model: String,

    /// Path to a HuggingFace `tokenizer.json` for exact token counting.
    /// When unset, a character heuristic is used.
    pub tokenizer_path: Option<PathBuf>,

    /// Whether LLM reranking runs at all. Default: `true`.
    pub rerank_enabled: bool,

    /// Minimum relevance score (0-3) a chunk needs to survive reranking.
    pub rerank_min_score: u8,

    /// Maximum chunks kept after reranking.
    pub rerank_max_chunks: usize,

    /// Maximum concurrent scoring calls.
    pub rerank_concurrency: usize,

    /// Per-call scoring timeout in seconds.
    pub rerank_timeout_secs: u64,

    /// Character cap on chunk text sent for scoring.
    pub rerank_max_chars: usize,

    /// Reranked-gate relevance threshold.
    pub relevance_threshold: f64,

    /// Reranked-gate minimum chunks at or above the threshold.
    pub min_chunks_above_threshold: usize,

    /// Retrieval-gate score floor.
    pub retrieval_min_score: f64,

    /// Retrieval-gate top1/top2 separation requirement.
    pub retrieval_min_ratio: f64,

    /// Token ceiling on the assembled generation prompt.
    pub max_context_tokens: usize,

    /// Budget enforcement mode. Default: `full_prompt`.
    pub budget_mode: BudgetMode,

    /// Capacity of the defined-terms cache.
    pub definitions_capacity: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("./.data"),
            provider: "default".to_string(),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            tokenizer_path: None,
            rerank_enabled: true,
            rerank_min_score: DEFAULT_MIN_RELEVANCE,
            rerank_max_chunks: DEFAULT_MAX_KEPT_CHUNKS,
            rerank_concurrency: DEFAULT_RERANK_CONCURRENCY,
            rerank_timeout_secs: DEFAULT_RERANK_TIMEOUT_SECS,
            rerank_max_chars: DEFAULT_RERANK_MAX_CHARS,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            min_chunks_above_threshold: DEFAULT_MIN_CHUNKS_ABOVE_THRESHOLD,
            retrieval_min_score: DEFAULT_RETRIEVAL_MIN_SCORE,
            retrieval_min_ratio: DEFAULT_RETRIEVAL_MIN_RATIO,
            max_context_tokens: DEFAULT_MAX_CONTEXT_TOKENS,
            budget_mode: BudgetMode::default(),
            definitions_capacity: DEFAULT_DEFINITIONS_CACHE_CAPACITY,
        }
    }
}

impl Config {
    const ENV_INDEX_DIR: &'static str = "COVENANT_INDEX_DIR";
    const ENV_PROVIDER: &'static str = "COVENANT_PROVIDER";
    const ENV_QDRANT_URL: &'static str = "COVENANT_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "COVENANT_COLLECTION";
    const ENV_GENERATION_MODEL: &'static str = "COVENANT_GENERATION_MODEL";
    const ENV_TOKENIZER_PATH: &'static str = "COVENANT_TOKENIZER_PATH";
    const ENV_RERANK_ENABLED: &'static str = "COVENANT_RERANK_ENABLED";
    const ENV_RERANK_MIN_SCORE: &'static str = "COVENANT_RERANK_MIN_SCORE";
    const ENV_RERANK_MAX_CHUNKS: &'static str = "COVENANT_RERANK_MAX_CHUNKS";
    const ENV_RERANK_CONCURRENCY: &'static str = "COVENANT_RERANK_CONCURRENCY";
    const ENV_RERANK_TIMEOUT_SECS: &'static str = "COVENANT_RERANK_TIMEOUT_SECS";
    const ENV_RERANK_MAX_CHARS: &'static str = "COVENANT_RERANK_MAX_CHARS";
    const ENV_RELEVANCE_THRESHOLD: &'static str = "COVENANT_RELEVANCE_THRESHOLD";
    const ENV_MIN_CHUNKS: &'static str = "COVENANT_MIN_CHUNKS_ABOVE_THRESHOLD";
    const ENV_RETRIEVAL_MIN_SCORE: &'static str = "COVENANT_RETRIEVAL_MIN_SCORE";
    const ENV_RETRIEVAL_MIN_RATIO: &'static str = "COVENANT_RETRIEVAL_MIN_RATIO";
    const ENV_MAX_CONTEXT_TOKENS: &'static str = "COVENANT_MAX_CONTEXT_TOKENS";
    const ENV_BUDGET_MODE: &'static str = "COVENANT_BUDGET_MODE";
    const ENV_DEFINITIONS_CAPACITY: &'static str = "COVENANT_DEFINITIONS_CAPACITY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let budget_mode = match env::var(Self::ENV_BUDGET_MODE) {
            Ok(value) => value.parse()?,
            Err(_) => defaults.budget_mode,
        };

        let config = Self {
            index_dir: Self::parse_path_from_env(Self::ENV_INDEX_DIR, defaults.index_dir),
            provider: Self::parse_string_from_env(Self::ENV_PROVIDER, defaults.provider),
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            collection: Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection),
            generation_model: Self::parse_string_from_env(
                Self::ENV_GENERATION_MODEL,
                defaults.generation_model,
            ),
            tokenizer_path: Self::parse_optional_path_from_env(Self::ENV_TOKENIZER_PATH),
            rerank_enabled: Self::parse_bool_from_env(
                Self::ENV_RERANK_ENABLED,
                defaults.rerank_enabled,
            ),
            rerank_min_score: Self::parse_from_env(
                Self::ENV_RERANK_MIN_SCORE,
                defaults.rerank_min_score,
            ),
            rerank_max_chunks: Self::parse_from_env(
                Self::ENV_RERANK_MAX_CHUNKS,
                defaults.rerank_max_chunks,
            ),
            rerank_concurrency: Self::parse_from_env(
                Self::ENV_RERANK_CONCURRENCY,
                defaults.rerank_concurrency,
            ),
            rerank_timeout_secs: Self::parse_from_env(
                Self::ENV_RERANK_TIMEOUT_SECS,
                defaults.rerank_timeout_secs,
            ),
            rerank_max_chars: Self::parse_from_env(
                Self::ENV_RERANK_MAX_CHARS,
                defaults.rerank_max_chars,
            ),
            relevance_threshold: Self::parse_from_env(
                Self::ENV_RELEVANCE_THRESHOLD,
                defaults.relevance_threshold,
            ),
            min_chunks_above_threshold: Self::parse_from_env(
                Self::ENV_MIN_CHUNKS,
                defaults.min_chunks_above_threshold,
            ),
            retrieval_min_score: Self::parse_from_env(
                Self::ENV_RETRIEVAL_MIN_SCORE,
                defaults.retrieval_min_score,
            ),
            retrieval_min_ratio: Self::parse_from_env(
                Self::ENV_RETRIEVAL_MIN_RATIO,
                defaults.retrieval_min_ratio,
            ),
            max_context_tokens: Self::parse_from_env(
                Self::ENV_MAX_CONTEXT_TOKENS,
                defaults.max_context_tokens,
            ),
            budget_mode,
            definitions_capacity: Self::parse_from_env(
                Self::ENV_DEFINITIONS_CAPACITY,
                defaults.definitions_capacity,
            ),
        };

        Ok(config)
    }

    /// Validates thresholds and paths (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rerank_min_score > 3 {
            return Err(ConfigError::InvalidMinRelevance {
                value: self.rerank_min_score,
            });
        }

        if self.rerank_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency {
                value: self.rerank_concurrency,
            });
        }

        if self.retrieval_min_ratio < 1.0 {
            return Err(ConfigError::InvalidMinRatio {
                value: self.retrieval_min_ratio,
            });
        }

        if self.index_dir.exists() && !self.index_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.index_dir.clone(),
            });
        }

        if let Some(ref path) = self.tokenizer_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Per-call scoring timeout as a [`Duration`].
    pub fn rerank_timeout(&self) -> Duration {
        Duration::from_secs(self.rerank_timeout_secs)
    }

    /// Reranker tuning mapped from the `COVENANT_RERANK_*` knobs.
    pub fn reranker_config(&self) -> RerankerConfig {
        RerankerConfig {
            min_score: self.rerank_min_score,
            max_chunks: self.rerank_max_chunks,
            concurrency: self.rerank_concurrency,
            timeout: self.rerank_timeout(),
            max_chars: self.rerank_max_chars,
        }
    }

    /// Gate over reranked relevance scores, mapped from this configuration.
    pub fn reranked_gate(&self) -> RerankedGate {
        RerankedGate {
            relevance_threshold: self.relevance_threshold,
            min_chunks: self.min_chunks_above_threshold,
        }
    }

    /// Gate over raw retrieval scores, mapped from this configuration.
    pub fn retrieval_gate(&self) -> RetrievalGate {
        RetrievalGate {
            min_score: self.retrieval_min_score,
            min_ratio: self.retrieval_min_ratio,
        }
    }

    /// Budgeter over `counter` with this configuration's ceiling and mode.
    pub fn budgeter<T: TokenCounter>(&self, counter: T) -> ContextBudgeter<T> {
        ContextBudgeter::with_limits(counter, self.max_context_tokens, self.budget_mode)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .ok()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(default)
    }

    fn parse_from_env<T: std::str::FromStr>(var_name: &str, default: T) -> T {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
