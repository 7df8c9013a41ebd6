//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::budget::InvalidBudgetMode;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Relevance score threshold is outside the 0-3 scale.
    #[error("invalid minimum relevance score '{value}': must be between 0 and 3")]
    InvalidMinRelevance { value: u8 },

    /// Rerank concurrency must be at least 1.
    #[error("invalid rerank concurrency '{value}': must be at least 1")]
    InvalidConcurrency { value: usize },

    /// Separation ratio must be at least 1.
    #[error("invalid retrieval min ratio '{value}': must be at least 1.0")]
    InvalidMinRatio { value: f64 },

    /// Budget mode string was not recognized.
    #[error(transparent)]
    InvalidBudgetMode(#[from] InvalidBudgetMode),

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
