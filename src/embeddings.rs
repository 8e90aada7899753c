//! Embedding client: text-to-vector conversion plus dimension bookkeeping.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::RagError;
use crate::llm::LlmProvider;

/// Known vector dimensions for recognized embedding models.
const EMBEDDING_DIMENSIONS: [(&str, usize); 2] = [
    ("openai/text-embedding-3-small", 1536),
    ("openai/text-embedding-3-large", 3072),
];

/// Return the expected vector dimension for an embeddings model.
///
/// An operator-supplied override wins over the known-model table; a model
/// that is neither recognized nor overridden is an `UnknownModelDimension`
/// error.
pub fn embedding_dimension(model: &str, dimension_override: Option<usize>) -> Result<usize, RagError> {
    if let Some(dim) = dimension_override {
        return Ok(dim);
    }
    EMBEDDING_DIMENSIONS
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, dim)| *dim)
        .ok_or_else(|| RagError::UnknownModelDimension {
            model: model.to_string(),
        })
}

/// An embedding model bound to a provider, with its dimension resolved up
/// front so the vector index can be created to match.
#[derive(Clone)]
pub struct EmbeddingModel {
    provider: Arc<dyn LlmProvider>,
    model: String,
    dimension: usize,
}

impl EmbeddingModel {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        dimension_override: Option<usize>,
    ) -> Result<Self, RagError> {
        let model = model.into();
        let dimension = embedding_dimension(&model, dimension_override)?;
        Ok(Self {
            provider,
            model,
            dimension,
        })
    }

    pub fn from_settings(provider: Arc<dyn LlmProvider>, settings: &Settings) -> Result<Self, RagError> {
        Self::new(
            provider,
            settings.embeddings_model.clone(),
            settings.embeddings_dimension_override,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed a batch of texts; one vector per input, order-preserving.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        self.provider.embed(texts, &self.model).await
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let input = [text.to_string()];
        let mut vectors = self.embed(&input).await?;
        vectors.pop().ok_or_else(|| {
            RagError::ModelUnavailable(format!("embeddings for '{}' returned no vector", self.model))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_models_have_dimensions() {
        assert_eq!(embedding_dimension("openai/text-embedding-3-small", None).unwrap(), 1536);
        assert_eq!(embedding_dimension("openai/text-embedding-3-large", None).unwrap(), 3072);
    }

    #[test]
    fn override_wins_over_table() {
        assert_eq!(embedding_dimension("openai/text-embedding-3-small", Some(256)).unwrap(), 256);
    }

    #[test]
    fn unknown_model_without_override_fails() {
        let err = embedding_dimension("acme/embedder-v9", None).unwrap_err();
        assert!(matches!(err, crate::error::RagError::UnknownModelDimension { .. }));
        assert!(err.to_string().contains("acme/embedder-v9"));
    }

    #[test]
    fn unknown_model_with_override_succeeds() {
        assert_eq!(embedding_dimension("acme/embedder-v9", Some(768)).unwrap(), 768);
    }
}
