//! Retrieval-augmented FAQ chatbot pipeline.
//!
//! Ingestion: dataset → embeddings → Pinecone. Query time: question →
//! retrieval → chat completion, via either a two-step chain or a
//! tool-calling agent.

pub mod agent;
pub mod chain;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod logging;
pub mod store;
