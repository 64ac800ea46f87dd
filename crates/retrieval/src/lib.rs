pub mod embeddings;
pub mod pinecone;

pub use embeddings::{Embedder, EmbeddingClient};
pub use pinecone::{Match, PineconeIndex, VectorIndex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const DEFAULT_TOP_K: usize = 100;

/// A source document behind one or more retrieved passages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePaper {
    pub title: String,
    pub authors: String,
}

/// Passage texts plus the distinct papers they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieved {
    pub texts: Vec<String>,
    pub sources: Vec<SourcePaper>,
}

impl Retrieved {
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Anything that can answer "which passages match this text".
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Never fails: errors are logged and reported as an empty result.
    async fn query(&self, user_query: &str, top_k: usize) -> Retrieved;
}

/// Embeds the query and runs one similarity search against the index.
pub struct RagService {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl RagService {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    async fn try_query(&self, user_query: &str, top_k: usize) -> anyhow::Result<Retrieved> {
        let vector = self.embedder.embed(user_query).await?;

        info!(top_k, "Querying vector index");
        let matches = self.index.query(vector, top_k).await?;
        info!(matches = matches.len(), "Vector index returned matches");

        Ok(partition_matches(&matches))
    }
}

#[async_trait]
impl Retriever for RagService {
    async fn query(&self, user_query: &str, top_k: usize) -> Retrieved {
        if user_query.is_empty() {
            warn!("Query is empty, returning no results");
            return Retrieved::default();
        }

        match self.try_query(user_query, top_k).await {
            Ok(retrieved) => retrieved,
            Err(e) => {
                error!(error = %e, "Retrieval failed");
                Retrieved::default()
            }
        }
    }
}

fn metadata_str<'a>(metadata: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

/// Authors may be stored as a string or a list of strings.
fn authors_of(metadata: &serde_json::Map<String, Value>) -> String {
    match metadata.get("authors") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Array(items)) => {
            let names: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            if names.is_empty() {
                "N/A".to_string()
            } else {
                names.join(", ")
            }
        }
        _ => "N/A".to_string(),
    }
}

/// Split matches into passage texts and first-seen unique papers by title.
pub fn partition_matches(matches: &[Match]) -> Retrieved {
    let mut retrieved = Retrieved::default();
    let mut seen_titles = HashSet::new();

    for m in matches {
        let Some(metadata) = m.metadata.as_ref() else {
            continue;
        };

        if let Some(text) = metadata_str(metadata, "text") {
            retrieved.texts.push(text.to_string());
        }

        if let Some(title) = metadata_str(metadata, "title") {
            if seen_titles.insert(title.to_string()) {
                retrieved.sources.push(SourcePaper {
                    title: title.to_string(),
                    authors: authors_of(metadata),
                });
            }
        }
    }

    retrieved
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn hit(id: &str, metadata: Value) -> Match {
        Match {
            id: id.to_string(),
            score: 0.5,
            metadata: metadata.as_object().cloned(),
        }
    }

    #[test]
    fn test_partition_dedups_titles_in_order() {
        let matches = vec![
            hit("1", json!({"text": "alpha", "title": "Mars Soil", "authors": "Kim"})),
            hit("2", json!({"text": "beta", "title": "Lunar Dust", "authors": "Lee"})),
            hit("3", json!({"text": "gamma", "title": "Mars Soil", "authors": "Kim"})),
        ];

        let retrieved = partition_matches(&matches);
        assert_eq!(retrieved.texts, vec!["alpha", "beta", "gamma"]);
        assert_eq!(
            retrieved.sources,
            vec![
                SourcePaper { title: "Mars Soil".into(), authors: "Kim".into() },
                SourcePaper { title: "Lunar Dust".into(), authors: "Lee".into() },
            ]
        );
    }

    #[test]
    fn test_partition_missing_fields() {
        let matches = vec![
            hit("1", json!({"title": "No Text"})),
            hit("2", json!({"text": "orphan"})),
            hit("3", json!({"text": "", "title": ""})),
            Match { id: "4".into(), score: 0.1, metadata: None },
        ];

        let retrieved = partition_matches(&matches);
        assert_eq!(retrieved.texts, vec!["orphan"]);
        assert_eq!(retrieved.sources.len(), 1);
        assert_eq!(retrieved.sources[0].authors, "N/A");
    }

    #[test]
    fn test_authors_list_joined() {
        let matches = vec![hit("1", json!({"text": "t", "title": "T", "authors": ["A", "B"]}))];
        assert_eq!(partition_matches(&matches).sources[0].authors, "A, B");
    }

    struct CountingEmbedder {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("embedding backend down");
            }
            Ok(vec![0.0; 4])
        }
    }

    struct FixedIndex {
        matches: Vec<Match>,
        last_top_k: AtomicUsize,
    }

    #[async_trait]
    impl VectorIndex for FixedIndex {
        async fn query(&self, _vector: Vec<f32>, top_k: usize) -> anyhow::Result<Vec<Match>> {
            self.last_top_k.store(top_k, Ordering::SeqCst);
            Ok(self.matches.clone())
        }
    }

    fn service(fail: bool, matches: Vec<Match>) -> (RagService, Arc<CountingEmbedder>, Arc<FixedIndex>) {
        let embedder = Arc::new(CountingEmbedder { calls: AtomicUsize::new(0), fail });
        let index = Arc::new(FixedIndex { matches, last_top_k: AtomicUsize::new(0) });
        (RagService::new(embedder.clone(), index.clone()), embedder, index)
    }

    #[tokio::test]
    async fn test_empty_query_skips_embedding() {
        let (rag, embedder, _) = service(false, Vec::new());

        let retrieved = rag.query("", DEFAULT_TOP_K).await;
        assert!(retrieved.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_returns_empty() {
        let matches = vec![hit("1", json!({"text": "t", "title": "T"}))];
        let (rag, embedder, _) = service(true, matches);

        let retrieved = rag.query("ice on mars", DEFAULT_TOP_K).await;
        assert!(retrieved.is_empty());
        assert!(retrieved.sources.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_query_forwards_top_k() {
        let matches = vec![hit("1", json!({"text": "t", "title": "T"}))];
        let (rag, _, index) = service(false, matches);

        let retrieved = rag.query("ice on mars", 7).await;
        assert_eq!(retrieved.texts, vec!["t"]);
        assert_eq!(index.last_top_k.load(Ordering::SeqCst), 7);
    }
}
