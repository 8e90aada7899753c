use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::dataset::{DocumentMetadata, IndexedDocument};
use crate::embeddings::EmbeddingModel;
use crate::error::RagError;
use super::index::{VectorIndex, VectorPoint};

/// A retrieved document with its similarity score.
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    pub document: IndexedDocument,
    pub score: f32,
}

/// Retrieval seam consumed by the answer composers.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `k` documents, similarity-descending.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>, RagError>;
}

/// Gateway over a remote vector index plus the embedding model feeding it.
///
/// Holds the resolved index name; the requested name may have been forked to
/// `{name}-d{dimension}` when an existing index had a different dimension.
pub struct VectorStore {
    index: Arc<dyn VectorIndex>,
    embedder: EmbeddingModel,
    index_name: String,
}

impl VectorStore {
    /// Ensure the index exists with the embedder's dimension and connect.
    pub async fn connect(
        index: Arc<dyn VectorIndex>,
        embedder: EmbeddingModel,
        requested_name: &str,
    ) -> Result<Self, RagError> {
        let index_name =
            Self::ensure_index(index.as_ref(), requested_name, embedder.dimension()).await?;
        Ok(Self {
            index,
            embedder,
            index_name,
        })
    }

    /// Idempotent index resolution.
    ///
    /// Missing index: create it and return `name`. Existing with matching
    /// dimension: return `name`. Existing with a different dimension: fork to
    /// `{name}-d{dimension}` (creating it if absent) and return the fork; the
    /// mismatched index is never touched.
    pub async fn ensure_index(
        index: &dyn VectorIndex,
        name: &str,
        dimension: usize,
    ) -> Result<String, RagError> {
        match index.describe(name).await? {
            None => {
                tracing::info!("Creating index '{}' with dimension {}", name, dimension);
                index.create(name, dimension).await?;
                Ok(name.to_string())
            }
            Some(desc) if desc.dimension == dimension => {
                tracing::info!("Index '{}' already exists", name);
                Ok(name.to_string())
            }
            Some(desc) => {
                let fallback = format!("{}-d{}", name, dimension);
                tracing::warn!(
                    "Index '{}' has dimension {}, expected {}. Using '{}' instead",
                    name,
                    desc.dimension,
                    dimension,
                    fallback
                );
                if index.describe(&fallback).await?.is_none() {
                    tracing::info!("Creating index '{}' with dimension {}", fallback, dimension);
                    index.create(&fallback, dimension).await?;
                }
                Ok(fallback)
            }
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Embed and store a batch of documents; returns the generated ids in
    /// input order, one per document.
    ///
    /// The whole batch is embedded before anything is written, so an
    /// embedding failure leaves the index unchanged.
    pub async fn add_documents(&self, documents: &[IndexedDocument]) -> Result<Vec<String>, RagError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let contents: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = self.embedder.embed(&contents).await?;

        let ids: Vec<String> = documents.iter().map(|_| Uuid::new_v4().to_string()).collect();
        let points: Vec<VectorPoint> = documents
            .iter()
            .zip(vectors)
            .zip(&ids)
            .map(|((doc, values), id)| VectorPoint {
                id: id.clone(),
                values,
                metadata: json!({
                    "source": doc.metadata.source,
                    "question": doc.metadata.question,
                    "index": doc.metadata.index,
                    "content": doc.content,
                }),
            })
            .collect();

        self.index.upsert(&self.index_name, points).await?;
        Ok(ids)
    }
}

#[async_trait]
impl Retriever for VectorStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>, RagError> {
        let query_vector = self.embedder.embed_query(query).await?;
        let matches = self.index.query(&self.index_name, &query_vector, k).await?;

        let mut results: Vec<RetrievedDocument> = matches
            .into_iter()
            .filter_map(|point| {
                let metadata = &point.metadata;
                let content = metadata.get("content").and_then(|v| v.as_str());
                let question = metadata.get("question").and_then(|v| v.as_str());
                let source = metadata.get("source").and_then(|v| v.as_str());
                let index = metadata.get("index").and_then(|v| v.as_u64());

                match (content, question, source, index) {
                    (Some(content), Some(question), Some(source), Some(index)) => {
                        Some(RetrievedDocument {
                            document: IndexedDocument {
                                content: content.to_string(),
                                metadata: DocumentMetadata {
                                    source: source.to_string(),
                                    question: question.to_string(),
                                    index: index as usize,
                                },
                            },
                            score: point.score,
                        })
                    }
                    _ => {
                        tracing::warn!("Dropping match '{}' with incomplete metadata", point.id);
                        None
                    }
                }
            })
            .collect();

        // Backends return similarity-descending already; re-sort stably in
        // case one does not.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }
}
