use serde_json::Value;

/// Parallel-array response from a similarity query.
///
/// Index `i` of every array describes the same hit. `distances[i]` is
/// non-negative; smaller means more similar.
#[derive(Debug, Clone, Default)]
pub struct VectorQueryResponse {
    /// Chunk ids, nearest first.
    pub ids: Vec<String>,
    /// Chunk texts.
    pub documents: Vec<String>,
    /// Raw (not yet normalized) metadata records.
    pub metadatas: Vec<Value>,
    /// Embedding distances.
    pub distances: Vec<f64>,
}

impl VectorQueryResponse {
    /// Number of hits.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` when the query matched nothing.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Parallel-array response from a fetch-by-id.
///
/// Ids absent from the corpus are omitted, so `ids` may be shorter than the
/// requested list.
#[derive(Debug, Clone, Default)]
pub struct VectorGetResponse {
    /// Chunk ids actually found.
    pub ids: Vec<String>,
    /// Chunk texts.
    pub documents: Vec<String>,
    /// Raw metadata records.
    pub metadatas: Vec<Value>,
}

/// Converts an embedding distance to a similarity in `(0, 1]`.
pub fn distance_to_similarity(distance: f64) -> f64 {
    1.0 / (1.0 + distance.max(0.0))
}
