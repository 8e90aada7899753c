use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the FAQ RAG pipeline.
///
/// Every variant is terminal for the operation that raised it; there is no
/// automatic retry. A dimension mismatch against an existing index is not an
/// error; it is resolved by the index-name fork in the store gateway.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("dataset not found at '{path}'. Download it from Kaggle and place it under data/:\n  https://www.kaggle.com/datasets/saadmakhdoom/ecommerce-faq-chatbot-dataset")]
    DatasetNotFound { path: PathBuf },

    #[error("malformed dataset: {0}")]
    MalformedDataset(String),

    #[error("missing credential: {0} is not set. Add it to your environment or .env file")]
    MissingCredential(&'static str),

    #[error("unknown embedding dimension for model '{model}'. Set OPENROUTER_EMBEDDINGS_DIMENSION to the correct size")]
    UnknownModelDimension { model: String },

    #[error("vector store unavailable: {0}")]
    VectorStoreUnavailable(String),

    #[error("index '{0}' does not exist; run the indexing pipeline first")]
    CollectionNotFound(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
}

impl RagError {
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        RagError::VectorStoreUnavailable(err.to_string())
    }

    pub fn model<E: std::fmt::Display>(err: E) -> Self {
        RagError::ModelUnavailable(err.to_string())
    }
}
