use std::env;
use std::path::PathBuf;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const PINECONE_BASE_URL: &str = "https://api.pinecone.io";

pub const DEFAULT_EMBEDDINGS_MODEL: &str = "openai/text-embedding-3-small";
pub const DEFAULT_CHAT_MODEL: &str = "mistralai/mistral-7b-instruct";
pub const DEFAULT_TOOL_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_INDEX_NAME: &str = "rag-langchain-index";
pub const DEFAULT_DATASET_PATH: &str = "data/Ecommerce_FAQ_Chatbot_dataset.json";

/// Process configuration, read once at startup and passed explicitly to each
/// component's constructor.
///
/// API keys stay optional here; the client constructors report
/// `MissingCredential` so the failure happens before any network call.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openrouter_api_key: Option<String>,
    pub pinecone_api_key: Option<String>,
    pub embeddings_model: String,
    pub embeddings_dimension_override: Option<usize>,
    pub chat_model: String,
    pub tool_model: String,
    pub index_name: String,
    pub pinecone_cloud: String,
    pub pinecone_region: String,
    pub dataset_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        let dimension_override = env_var("OPENROUTER_EMBEDDINGS_DIMENSION").and_then(|raw| {
            match raw.parse::<usize>() {
                Ok(dim) => Some(dim),
                Err(_) => {
                    tracing::warn!(
                        "Ignoring OPENROUTER_EMBEDDINGS_DIMENSION='{}': not a positive integer",
                        raw
                    );
                    None
                }
            }
        });

        Settings {
            openrouter_api_key: env_var("OPENROUTER_API_KEY"),
            pinecone_api_key: env_var("PINECONE_API_KEY"),
            embeddings_model: env_var("OPENROUTER_EMBEDDINGS_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDINGS_MODEL.to_string()),
            embeddings_dimension_override: dimension_override,
            chat_model: env_var("OPENROUTER_CHAT_MODEL")
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            tool_model: env_var("OPENROUTER_TOOL_MODEL")
                .unwrap_or_else(|| DEFAULT_TOOL_MODEL.to_string()),
            index_name: env_var("PINECONE_INDEX_NAME")
                .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            pinecone_cloud: env_var("PINECONE_CLOUD").unwrap_or_else(|| "aws".to_string()),
            pinecone_region: env_var("PINECONE_REGION")
                .unwrap_or_else(|| "us-east-1".to_string()),
            dataset_path: env_var("FAQ_DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH)),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global; these tests only touch keys no other test
    // reads to stay order-independent.

    #[test]
    fn dimension_override_parses() {
        std::env::set_var("OPENROUTER_EMBEDDINGS_DIMENSION", "768");
        let settings = Settings::from_env();
        assert_eq!(settings.embeddings_dimension_override, Some(768));
        std::env::remove_var("OPENROUTER_EMBEDDINGS_DIMENSION");
    }

    #[test]
    fn blank_value_treated_as_unset() {
        std::env::set_var("PINECONE_CLOUD", "   ");
        let settings = Settings::from_env();
        assert_eq!(settings.pinecone_cloud, "aws");
        std::env::remove_var("PINECONE_CLOUD");
    }
}
