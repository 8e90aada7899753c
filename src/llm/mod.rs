//! LLM integration module.
//!
//! This module provides:
//! - `LlmProvider`: abstract interface over chat and embedding models
//! - `OpenRouterProvider`: OpenAI-compatible client for the OpenRouter gateway

mod openrouter;
mod provider;
mod types;


pub use openrouter::OpenRouterProvider;
pub use provider::LlmProvider;
pub use types::{AssistantTurn, ChatMessage, ChatRequest, FunctionCall, ToolCall, ToolSpec};
