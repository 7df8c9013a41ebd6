use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the keyword index.
pub enum KeywordError {
    /// `add` was called with mismatched input lengths. Programmer error.
    #[error("chunk id and text counts differ: {ids} ids, {texts} texts")]
    SizeMismatch {
        /// Number of chunk ids supplied.
        ids: usize,
        /// Number of texts supplied.
        texts: usize,
    },

    /// `query` was called before `build`.
    #[error("keyword index queried before build()")]
    NotBuilt,

    /// No usable index at the given path (missing, wrong magic, or corrupt).
    ///
    /// Loading fails closed: a foreign or damaged file is reported the same
    /// way as an absent one, with the underlying cause logged.
    #[error("keyword index not found for provider {provider:?} at {path}")]
    NotFound {
        /// Provider whose index was requested.
        provider: String,
        /// Path that was probed.
        path: PathBuf,
    },

    /// Filesystem error while persisting the index.
    #[error("keyword index io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for keyword index operations.
pub type KeywordResult<T> = Result<T, KeywordError>;
