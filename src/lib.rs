//! Covenant retrieval library (used by the surrounding service and
//! integration tests).
//!
//! Retrieval core for licensing-document question answering: BM25 keyword
//! search, hybrid vector+keyword fusion, LLM reranking, confidence gating,
//! and token budgeting. The crate exposes no CLI or HTTP surface; the
//! service invokes [`QueryPipeline::search`] and hands the outcome to its
//! answer-generation step.
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`QueryPipeline`], [`PipelineOutcome`], [`PipelineError`] - End-to-end
//!   query orchestration
//!
//! ## Retrieval
//! - [`KeywordIndex`], [`KeywordError`] - Persisted BM25 index
//! - [`HybridSearcher`], [`HybridSearcherConfig`], [`SearchMode`],
//!   [`SearchResult`], [`ResultSource`] - Vector/keyword/hybrid search
//!
//! ## Scoring & Gating
//! - [`Reranker`], [`RerankerConfig`], [`ScoredChunk`] - LLM relevance scoring
//! - [`GateStrategy`], [`RerankedGate`], [`RetrievalGate`], [`GateDecision`],
//!   [`RefusalReason`] - Refuse-or-answer decisions
//!
//! ## Budgeting
//! - [`ContextBudgeter`], [`BudgetMode`], [`BudgetInfo`], [`PromptTemplate`] -
//!   Token-ceiling enforcement
//!
//! ## Collaborators
//! - [`VectorStore`], [`Embedder`], [`QdrantVectorStore`] - Vector database
//! - [`TextGenerator`], [`GenaiGenerator`] - Scoring/generation model
//! - [`TokenCounter`], [`HfTokenCounter`], [`HeuristicTokenCounter`] -
//!   Token counting
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod budget;
pub mod config;
pub mod constants;
pub mod corpus;
pub mod definitions;
pub mod gate;
pub mod keyword;
pub mod llm;
pub mod pipeline;
pub mod rerank;
pub mod search;
pub mod tokenize;
pub mod vectordb;

pub use budget::{
    BudgetInfo, BudgetMode, ContextBudgeter, DroppedChunk, InvalidBudgetMode, PromptTemplate,
};
pub use config::{Config, ConfigError};
pub use corpus::{Chunk, ChunkMetadata};
pub use definitions::DefinitionsCache;
pub use gate::{GateDecision, GateStrategy, RefusalReason, RerankedGate, RetrievalGate};
pub use keyword::{KeywordError, KeywordIndex, KeywordResult};
pub use llm::{GenaiGenerator, GenerationOptions, LlmError, TextGenerator};
#[cfg(any(test, feature = "mock"))]
pub use llm::MockGenerator;
pub use pipeline::{PipelineError, PipelineOutcome, QueryPipeline};
pub use rerank::{Reranker, RerankerConfig, ScoredChunk};
pub use search::{
    HybridSearcher, HybridSearcherConfig, InvalidSearchMode, ResultSource, SearchError,
    SearchMode, SearchResult,
};
pub use tokenize::{HeuristicTokenCounter, HfTokenCounter, TokenCounter};
#[cfg(any(test, feature = "mock"))]
pub use tokenize::WordTokenCounter;
pub use vectordb::{
    Embedder, QdrantVectorStore, VectorGetResponse, VectorQueryResponse, VectorStore,
    VectorStoreError,
};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorStore;
