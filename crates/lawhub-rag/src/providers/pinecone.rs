//! Pinecone remote vector index over the data-plane REST API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::PineconeConfig;
use crate::error::{Error, Result};
use crate::types::Chunk;

use super::vector_store::{VectorSearchResult, VectorStoreProvider};

/// Pinecone caps upsert requests at a few megabytes; stay well below
const UPSERT_BATCH_SIZE: usize = 100;

const API_VERSION: &str = "2024-07";

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: String,
    values: &'a [f32],
    metadata: std::collections::HashMap<String, serde_json::Value>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    namespace: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    namespace: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAllRequest<'a> {
    delete_all: bool,
    namespace: &'a str,
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
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    total_vector_count: usize,
}

/// Remote index backed by a Pinecone serverless or pod index
pub struct PineconeVectorStore {
    client: Client,
    host: String,
    index_name: String,
    namespace: String,
}

impl PineconeVectorStore {
    /// Create a client for a configured index
    pub fn new(config: &PineconeConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(Error::Config(
                "Pinecone requires both an API key and an index host".to_string(),
            ));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        let api_key = reqwest::header::HeaderValue::from_str(config.api_key.trim())
            .map_err(|e| Error::Config(format!("Invalid Pinecone API key: {}", e)))?;
        headers.insert("Api-Key", api_key);
        headers.insert(
            "X-Pinecone-API-Version",
            reqwest::header::HeaderValue::from_static(API_VERSION),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            host: normalize_host(&config.index_host),
            index_name: config.index_name.clone(),
            namespace: config.namespace.clone(),
        })
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.host, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Pinecone request to {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_db(format!(
                "Pinecone {} failed: HTTP {} - {}",
                path, status, body
            )));
        }

        Ok(response)
    }

    async fn stats(&self) -> Result<IndexStats> {
        let response = self.post("/describe_index_stats", &serde_json::json!({})).await?;
        response
            .json()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to parse index stats: {}", e)))
    }

    /// Index dimension as reported by Pinecone
    pub async fn dimension(&self) -> Result<Option<usize>> {
        Ok(self.stats().await?.dimension)
    }
}

/// Accept hosts with or without scheme and trailing slash
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl VectorStoreProvider for PineconeVectorStore {
    async fn upsert(&self, chunks: &[Chunk]) -> Result<()> {
        for batch in chunks.chunks(UPSERT_BATCH_SIZE) {
            let vectors = batch
                .iter()
                .map(|chunk| {
                    let values = chunk.embedding.as_deref().ok_or_else(|| {
                        Error::vector_db(format!("Chunk {} has no embedding", chunk.id()))
                    })?;
                    Ok(UpsertVector {
                        id: chunk.id(),
                        values,
                        metadata: chunk.to_vector_metadata(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            self.post(
                "/vectors/upsert",
                &UpsertRequest {
                    vectors,
                    namespace: &self.namespace,
                },
            )
            .await?;
        }

        tracing::info!("Upserted {} vectors to Pinecone index {}", chunks.len(), self.index_name);
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorSearchResult>> {
        let response = self
            .post(
                "/query",
                &QueryRequest {
                    vector: query_embedding,
                    top_k,
                    include_metadata: true,
                    namespace: &self.namespace,
                },
            )
            .await?;

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to parse query response: {}", e)))?;

        let mut results = Vec::with_capacity(parsed.matches.len());
        for m in parsed.matches {
            match m.metadata.as_ref().and_then(Chunk::from_vector_metadata) {
                Some(chunk) => results.push(VectorSearchResult {
                    chunk,
                    similarity: m.score,
                }),
                None => tracing::warn!("Pinecone match {} has no usable metadata", m.id),
            }
        }

        // Pinecone returns best first; keep that order stable on equal scores
        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        Ok(results)
    }

    async fn clear(&self) -> Result<()> {
        self.post(
            "/vectors/delete",
            &DeleteAllRequest {
                delete_all: true,
                namespace: &self.namespace,
            },
        )
        .await?;
        tracing::info!("Cleared Pinecone index {}", self.index_name);
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.stats().await?.total_vector_count)
    }

    async fn health_check(&self) -> Result<bool> {
        match self.stats().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::debug!("Pinecone health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        "pinecone"
    }

    fn descriptor(&self) -> String {
        format!("Pinecone ({})", self.index_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PineconeConfig {
        PineconeConfig {
            api_key: "pc-test".to_string(),
            index_host: "lawhub-constitution-abc.svc.pinecone.io/".to_string(),
            ..PineconeConfig::default()
        }
    }

    #[test]
    fn test_requires_credentials() {
        let err = PineconeVectorStore::new(&PineconeConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_host_normalization() {
        let store = PineconeVectorStore::new(&config()).unwrap();
        assert_eq!(store.host, "https://lawhub-constitution-abc.svc.pinecone.io");
        assert_eq!(store.descriptor(), "Pinecone (lawhub-constitution)");
        assert_eq!(normalize_host("http://localhost:5080"), "http://localhost:5080");
    }

    #[test]
    fn test_query_request_uses_camel_case() {
        let request = QueryRequest {
            vector: &[0.1, 0.2],
            top_k: 6,
            include_metadata: true,
            namespace: "",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["topK"], 6);
        assert_eq!(json["includeMetadata"], true);
    }

    #[test]
    fn test_query_response_parsing() {
        let body = r#"{"matches":[
            {"id":"a","score":0.9,"metadata":{"text":"Article 14","source":"coi.pdf","page":7.0}},
            {"id":"b","score":0.5}
        ],"namespace":""}"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.matches.len(), 2);

        let chunk = parsed.matches[0]
            .metadata
            .as_ref()
            .and_then(Chunk::from_vector_metadata)
            .unwrap();
        assert_eq!(chunk.metadata.page_number, 7);
        assert!(parsed.matches[1].metadata.is_none());
    }

    #[test]
    fn test_delete_all_request_shape() {
        let json = serde_json::to_value(DeleteAllRequest {
            delete_all: true,
            namespace: "constitution",
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"deleteAll": true, "namespace": "constitution"}));
    }

    #[test]
    fn test_stats_parsing() {
        let stats: IndexStats =
            serde_json::from_str(r#"{"dimension":384,"totalVectorCount":0,"namespaces":{}}"#)
                .unwrap();
        assert_eq!(stats.dimension, Some(384));
        assert_eq!(stats.total_vector_count, 0);
    }
}
