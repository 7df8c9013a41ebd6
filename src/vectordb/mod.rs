//! Vector search collaborator.
//!
//! The pipeline consumes similarity search through the narrow [`VectorStore`]
//! trait: `query` returns the nearest chunks to a question, `get` fetches
//! chunks by id so fused results can re-attach text and metadata. Distances
//! are non-negative; smaller means more similar.

pub mod error;
pub mod mock;
pub mod model;
pub mod qdrant;

pub use error::VectorStoreError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockVectorStore;
pub use model::{VectorGetResponse, VectorQueryResponse};
pub use qdrant::QdrantVectorStore;

/// Minimal async interface to the vector search collaborator.
pub trait VectorStore: Send + Sync {
    /// Returns up to `n` nearest chunks to `text`.
    fn query(
        &self,
        text: &str,
        n: usize,
    ) -> impl std::future::Future<Output = Result<VectorQueryResponse, VectorStoreError>> + Send;

    /// Fetches chunk text and metadata by id.
    fn get(
        &self,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<VectorGetResponse, VectorStoreError>> + Send;
}

/// Embedding model collaborator, used by vector store adapters that search by
/// vector rather than by text.
pub trait Embedder: Send + Sync {
    /// Embeds `text` into a dense vector.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, VectorStoreError>> + Send;
}
