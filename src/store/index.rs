use async_trait::async_trait;
use serde_json::Value;

use crate::error::RagError;

/// Description of an existing remote index.
#[derive(Debug, Clone)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    /// Data-plane host, when the backend separates control and data planes.
    pub host: Option<String>,
}

/// A vector with its id and metadata, ready for upsert.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Value,
}

/// A nearest-neighbor match returned by a query.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub id: String,
    /// Similarity score (higher = better).
    pub score: f32,
    pub metadata: Value,
}

/// Abstract interface over a remote vector collection API.
///
/// Implementations cover create/describe on the control plane and
/// upsert/query on the data plane. The dimension of an index is fixed at
/// creation; callers resolve mismatches, never the backend.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Describe an index, or `None` when it does not exist.
    async fn describe(&self, name: &str) -> Result<Option<IndexDescription>, RagError>;

    /// Create an index with the given dimension and cosine similarity metric.
    async fn create(&self, name: &str, dimension: usize) -> Result<(), RagError>;

    /// Insert or overwrite vectors in an index.
    async fn upsert(&self, name: &str, points: Vec<VectorPoint>) -> Result<(), RagError>;

    /// Return up to `top_k` nearest neighbors with metadata.
    async fn query(
        &self,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredPoint>, RagError>;
}
