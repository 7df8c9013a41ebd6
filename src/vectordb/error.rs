use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by vector store adapters.
pub enum VectorStoreError {
    /// Could not reach the vector database.
    #[error("vector store connection failed to {url}: {message}")]
    ConnectionFailed {
        /// Endpoint that was contacted.
        url: String,
        /// Error message.
        message: String,
    },

    /// Similarity search failed.
    #[error("vector search failed in {collection}: {message}")]
    SearchFailed {
        /// Collection searched.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Fetch-by-id failed.
    #[error("vector store get failed in {collection}: {message}")]
    GetFailed {
        /// Collection queried.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Query embedding could not be produced.
    #[error("embedding failed: {message}")]
    EmbeddingFailed {
        /// Error message.
        message: String,
    },
}
