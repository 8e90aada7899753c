use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::config::Settings;
use crate::error::RagError;
use super::index::{IndexDescription, ScoredPoint, VectorIndex, VectorPoint};

/// Client for the Pinecone managed vector database.
///
/// Index create/describe go through the control plane; upsert/query go to the
/// per-index data-plane host, which is resolved via describe and cached.
#[derive(Debug)]
pub struct PineconeIndex {
    base_url: String,
    api_key: String,
    cloud: String,
    region: String,
    client: Client,
    hosts: Mutex<HashMap<String, String>>,
}

impl PineconeIndex {
    /// Fails with `MissingCredential` before any network call is attempted.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        cloud: &str,
        region: &str,
    ) -> Result<Self, RagError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(RagError::MissingCredential("PINECONE_API_KEY"))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            cloud: cloud.to_string(),
            region: region.to_string(),
            client: Client::new(),
            hosts: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, RagError> {
        Self::new(
            crate::config::PINECONE_BASE_URL,
            settings.pinecone_api_key.as_deref(),
            &settings.pinecone_cloud,
            &settings.pinecone_region,
        )
    }

    /// Resolve the data-plane base URL for an index.
    ///
    /// An index with no resolvable host was never created, which surfaces as
    /// `CollectionNotFound` on upsert/query.
    async fn data_plane_url(&self, name: &str) -> Result<String, RagError> {
        {
            let hosts = self.hosts.lock().await;
            if let Some(host) = hosts.get(name) {
                return Ok(host.clone());
            }
        }

        let desc = self
            .describe(name)
            .await?
            .ok_or_else(|| RagError::CollectionNotFound(name.to_string()))?;
        let host = desc
            .host
            .ok_or_else(|| RagError::VectorStoreUnavailable(format!("index '{}' has no data-plane host", name)))?;

        // The API reports a bare hostname; tests may hand back a full URL.
        let url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host)
        };

        let mut hosts = self.hosts.lock().await;
        hosts.insert(name.to_string(), url.clone());
        Ok(url)
    }
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    name: String,
    dimension: usize,
    #[serde(default)]
    host: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Value,
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn describe(&self, name: &str) -> Result<Option<IndexDescription>, RagError> {
        let url = format!("{}/indexes/{}", self.base_url, name);
        let res = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(RagError::store)?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::VectorStoreUnavailable(format!(
                "describe index '{}' failed with {}: {}",
                name, status, text
            )));
        }

        let desc: DescribeIndexResponse = res.json().await.map_err(RagError::store)?;
        Ok(Some(IndexDescription {
            name: desc.name,
            dimension: desc.dimension,
            host: desc.host,
        }))
    }

    async fn create(&self, name: &str, dimension: usize) -> Result<(), RagError> {
        let url = format!("{}/indexes", self.base_url);
        let body = json!({
            "name": name,
            "dimension": dimension,
            "metric": "cosine",
            "spec": {
                "serverless": {
                    "cloud": self.cloud,
                    "region": self.region,
                }
            }
        });

        let res = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RagError::store)?;

        // Conflict means another run created it first; that is fine.
        if res.status() == StatusCode::CONFLICT {
            tracing::debug!("Index '{}' already exists", name);
            return Ok(());
        }
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::VectorStoreUnavailable(format!(
                "create index '{}' failed with {}: {}",
                name, status, text
            )));
        }

        Ok(())
    }

    async fn upsert(&self, name: &str, points: Vec<VectorPoint>) -> Result<(), RagError> {
        let data_url = self.data_plane_url(name).await?;
        let url = format!("{}/vectors/upsert", data_url);

        let vectors: Vec<Value> = points
            .iter()
            .map(|p| {
                json!({
                    "id": p.id,
                    "values": p.values,
                    "metadata": p.metadata,
                })
            })
            .collect();

        let res = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&json!({ "vectors": vectors }))
            .send()
            .await
            .map_err(RagError::store)?;

        if res.status() == StatusCode::NOT_FOUND {
            return Err(RagError::CollectionNotFound(name.to_string()));
        }
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::VectorStoreUnavailable(format!(
                "upsert into '{}' failed with {}: {}",
                name, status, text
            )));
        }

        Ok(())
    }

    async fn query(
        &self,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredPoint>, RagError> {
        let data_url = self.data_plane_url(name).await?;
        let url = format!("{}/query", data_url);

        let body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });

        let res = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RagError::store)?;

        if res.status() == StatusCode::NOT_FOUND {
            return Err(RagError::CollectionNotFound(name.to_string()));
        }
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::VectorStoreUnavailable(format!(
                "query against '{}' failed with {}: {}",
                name, status, text
            )));
        }

        let payload: QueryResponse = res.json().await.map_err(RagError::store)?;
        Ok(payload
            .matches
            .into_iter()
            .map(|m| ScoredPoint {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }
}
