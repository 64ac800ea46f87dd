use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

const API_VERSION: &str = "2024-07";

/// One nearest-neighbour hit with its stored metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Match {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// A managed vector index queried by similarity.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<Match>>;
}

/// Pinecone serverless index over the REST data plane.
pub struct PineconeIndex {
    host: String,
    api_key: String,
    index_name: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct IndexDescription {
    host: String,
}

#[derive(Serialize)]
struct QueryRequest {
    vector: Vec<f32>,
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

fn data_plane_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

impl PineconeIndex {
    /// Resolve the index host through the control plane.
    pub async fn connect(
        control_url: &str,
        api_key: String,
        index_name: String,
        client: reqwest::Client,
    ) -> Result<Self> {
        let url = format!("{}/indexes/{}", control_url.trim_end_matches('/'), index_name);

        let response = client
            .get(&url)
            .header("Api-Key", &api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .context("Failed to reach Pinecone control plane")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to describe index '{}' ({}): {}", index_name, status, error_text);
        }

        let description: IndexDescription = response
            .json()
            .await
            .context("Failed to parse index description")?;

        info!(index = %index_name, host = %description.host, "Connected to Pinecone index");

        Ok(Self::with_host(&description.host, api_key, index_name, client))
    }

    pub fn with_host(host: &str, api_key: String, index_name: String, client: reqwest::Client) -> Self {
        Self {
            host: data_plane_url(host),
            api_key,
            index_name,
            client,
        }
    }

    /// Index statistics (vector count, dimension, namespaces) as returned by Pinecone.
    pub async fn describe_index_stats(&self) -> Result<Value> {
        let url = format!("{}/describe_index_stats", self.host);

        let response = self.client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&serde_json::json!({}))
            .send()
            .await
            .context("Failed to request index stats")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to get index stats: {}", error_text);
        }

        response.json().await.context("Failed to parse index stats")
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<Match>> {
        let url = format!("{}/query", self.host);

        debug!(index = %self.index_name, top_k, dimension = vector.len(), "POST query");

        let body = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let response = self.client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&body)
            .send()
            .await
            .context("Failed to send query to Pinecone")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Pinecone query failed: {}", error_text);
        }

        let result: QueryResponse = response
            .json()
            .await
            .context("Failed to parse Pinecone response")?;

        Ok(result.matches)
    }
}
