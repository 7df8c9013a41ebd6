use thiserror::Error;

use crate::vectordb::VectorStoreError;

#[derive(Debug, Error)]
/// Errors returned by the hybrid searcher.
pub enum SearchError {
    /// The vector collaborator failed. Keyword-side failures never reach
    /// here; an unavailable keyword index degrades to an empty result set.
    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),
}
