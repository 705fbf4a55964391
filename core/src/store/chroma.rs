use super::VectorStore;
use crate::embeddings::Embedder;
use crate::models::{CorpusChunk, VectorHit};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Chroma HTTP client. Queries and documents are embedded locally through
/// the injected `Embedder` before they hit the server.
pub struct ChromaStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    embedder: Arc<dyn Embedder>,
    // Resolved lazily; cleared by reset() so the recreated collection
    // gets a fresh id.
    collection_id: RwLock<Option<String>>,
}

impl ChromaStore {
    pub fn new(
        base_url: Option<String>,
        collection: String,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let base = base_url
            .or_else(|| env::var("CHROMA_BASE_URL").ok())
            .unwrap_or_else(|| "http://localhost:8000".to_string());
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base.trim_end_matches('/').to_string(),
            collection,
            embedder,
            collection_id: RwLock::new(None),
        })
    }

    async fn collection_id(&self) -> Result<String> {
        if let Some(id) = self.collection_id.read().await.as_ref() {
            return Ok(id.clone());
        }
        let mut guard = self.collection_id.write().await;
        if let Some(id) = guard.as_ref() {
            return Ok(id.clone());
        }
        let res = self
            .client
            .post(format!("{}/api/v1/collections", self.base_url))
            .json(&json!({ "name": self.collection, "get_or_create": true }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;
        let id = res
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Invalid collection response from Chroma: {:?}", res))?
            .to_string();
        debug!(collection = %self.collection, id = %id, "resolved Chroma collection");
        *guard = Some(id.clone());
        Ok(id)
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder
            .embed(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| anyhow!("Embedder returned no vectors"))
    }
}

fn source_of(meta: &serde_json::Value) -> String {
    meta.get("source")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<VectorHit>> {
        let id = self.collection_id().await?;
        let embedding = self.embed_one(text).await?;
        let res = self
            .client
            .post(format!("{}/api/v1/collections/{}/query", self.base_url, id))
            .json(&json!({
                "query_embeddings": [embedding],
                "n_results": k,
                "include": ["documents", "metadatas", "distances"]
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let documents = res["documents"][0]
            .as_array()
            .ok_or_else(|| anyhow!("Invalid query response from Chroma: {:?}", res))?;
        let metadatas = res["metadatas"][0]
            .as_array()
            .ok_or_else(|| anyhow!("Missing metadatas in Chroma response"))?;
        let distances = res["distances"][0]
            .as_array()
            .ok_or_else(|| anyhow!("Missing distances in Chroma response"))?;

        let mut hits = Vec::with_capacity(documents.len());
        for i in 0..documents.len() {
            let text = documents[i].as_str().unwrap_or("").to_string();
            let source = metadatas
                .get(i)
                .map(source_of)
                .unwrap_or_default();
            let distance = distances
                .get(i)
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0) as f32;
            hits.push(VectorHit {
                text,
                source,
                distance,
            });
        }
        Ok(hits)
    }

    async fn get_all(&self) -> Result<Vec<CorpusChunk>> {
        let id = self.collection_id().await?;
        let res = self
            .client
            .post(format!("{}/api/v1/collections/{}/get", self.base_url, id))
            .json(&json!({ "include": ["documents", "metadatas"] }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let documents = res["documents"]
            .as_array()
            .ok_or_else(|| anyhow!("Invalid get response from Chroma: {:?}", res))?;
        let metadatas = res["metadatas"]
            .as_array()
            .ok_or_else(|| anyhow!("Missing metadatas in Chroma response"))?;

        let mut chunks = Vec::with_capacity(documents.len());
        for i in 0..documents.len() {
            chunks.push(CorpusChunk {
                text: documents[i].as_str().unwrap_or("").to_string(),
                source: metadatas.get(i).map(source_of).unwrap_or_default(),
            });
        }
        Ok(chunks)
    }

    async fn add(&self, ids: &[String], chunks: &[CorpusChunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let id = self.collection_id().await?;
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;
        let metadatas: Vec<serde_json::Value> = chunks
            .iter()
            .map(|c| json!({ "source": c.source }))
            .collect();

        self.client
            .post(format!("{}/api/v1/collections/{}/add", self.base_url, id))
            .json(&json!({
                "ids": ids,
                "embeddings": embeddings,
                "documents": texts,
                "metadatas": metadatas
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        let res = self
            .client
            .delete(format!(
                "{}/api/v1/collections/{}",
                self.base_url, self.collection
            ))
            .send()
            .await?;
        // 404 means there was nothing to clear
        if !res.status().is_success() && res.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(anyhow!(
                "Failed to delete Chroma collection: {}",
                res.status()
            ));
        }
        *self.collection_id.write().await = None;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let id = self.collection_id().await?;
        let res = self
            .client
            .get(format!(
                "{}/api/v1/collections/{}/count",
                self.base_url, id
            ))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;
        res.as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| anyhow!("Invalid count response from Chroma: {:?}", res))
    }
}
