use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::Settings;
use crate::error::RagError;
use super::provider::LlmProvider;
use super::types::{AssistantTurn, ChatMessage, ChatRequest, ToolSpec};

/// Client for the OpenRouter gateway (OpenAI-compatible REST API).
///
/// One instance serves both chat completions and embeddings; the model id is
/// chosen per call.
#[derive(Clone, Debug)]
pub struct OpenRouterProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenRouterProvider {
    /// Fails with `MissingCredential` before any network call is attempted.
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self, RagError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(RagError::MissingCredential("OPENROUTER_API_KEY"))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: Client::new(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, RagError> {
        Self::new(
            crate::config::OPENROUTER_BASE_URL,
            settings.openrouter_api_key.as_deref(),
        )
    }

    async fn completion(
        &self,
        request: ChatRequest,
        tools: Option<&[ToolSpec]>,
        model_id: &str,
    ) -> Result<ChatMessage, RagError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = json!({
            "model": model_id,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
            if let Some(tools) = tools {
                let specs: Vec<_> = tools.iter().map(ToolSpec::to_wire).collect();
                obj.insert("tools".to_string(), json!(specs));
            }
        }

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RagError::model)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::ModelUnavailable(format!(
                "chat completion for '{}' failed with {}: {}",
                model_id, status, text
            )));
        }

        let payload: ChatCompletionResponse = res.json().await.map_err(RagError::model)?;
        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| {
                RagError::ModelUnavailable(format!("chat completion for '{}' returned no choices", model_id))
            })
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, RagError> {
        let message = self.completion(request, None, model_id).await?;
        Ok(message.content.unwrap_or_default())
    }

    async fn chat_with_tools(
        &self,
        request: ChatRequest,
        tools: &[ToolSpec],
        model_id: &str,
    ) -> Result<AssistantTurn, RagError> {
        let message = self.completion(request, Some(tools), model_id).await?;
        Ok(AssistantTurn {
            content: message.content,
            tool_calls: message.tool_calls,
        })
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, RagError> {
        let url = format!("{}/embeddings", self.base_url);

        let body = json!({
            "model": model_id,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RagError::model)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::ModelUnavailable(format!(
                "embeddings for '{}' failed with {}: {}",
                model_id, status, text
            )));
        }

        let payload: EmbeddingsResponse = res.json().await.map_err(RagError::model)?;

        let mut data = payload.data;
        data.sort_by_key(|item| item.index);

        if data.len() != inputs.len() {
            return Err(RagError::ModelUnavailable(format!(
                "embeddings for '{}' returned {} vectors for {} inputs",
                model_id,
                data.len(),
                inputs.len()
            )));
        }

        Ok(data.into_iter().map(|item| item.embedding).collect())
    }
}
