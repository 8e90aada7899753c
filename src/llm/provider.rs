use async_trait::async_trait;

use crate::error::RagError;
use super::types::{AssistantTurn, ChatRequest, ToolSpec};

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "openrouter")
    fn name(&self) -> &str;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, RagError>;

    /// chat completion with tool calling enabled
    async fn chat_with_tools(
        &self,
        request: ChatRequest,
        tools: &[ToolSpec],
        model_id: &str,
    ) -> Result<AssistantTurn, RagError>;

    /// generate embeddings, one vector per input, order-preserving
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, RagError>;
}
