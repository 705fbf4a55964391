use crate::models::{round4, Chunk};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Cross-encoder relevance scoring: query and passage scored jointly, one
/// score per passage, indexed into the input list.
#[async_trait]
pub trait RerankScorer: Send + Sync {
    async fn score(&self, query: &str, passages: &[String]) -> Result<Vec<(usize, f32)>>;
}

/// Client for a rerank service. The model stays loaded on the server side;
/// a failed call is fatal for the current query, there is no fallback
/// ranking.
pub struct CrossEncoderClient {
    client: reqwest::Client,
    model: String,
    api_url: String,
}

impl CrossEncoderClient {
    pub fn new(model: String, api_base: Option<String>, timeout_secs: u64) -> Result<Self> {
        let base = api_base
            .or_else(|| env::var("RERANK_API_BASE").ok())
            .unwrap_or_else(|| "http://localhost:8787".to_string());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            model,
            api_url: format!("{}/rerank", base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl RerankScorer for CrossEncoderClient {
    async fn score(&self, query: &str, passages: &[String]) -> Result<Vec<(usize, f32)>> {
        let res = self
            .client
            .post(&self.api_url)
            .json(&json!({
                "model": self.model,
                "query": query,
                "documents": passages
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let results = res
            .get("results")
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow!("Invalid response from reranker: {:?}", res))?;

        let mut scored = Vec::with_capacity(results.len());
        for item in results {
            let index = item
                .get("index")
                .and_then(|v| v.as_u64())
                .ok_or_else(|| anyhow!("Missing index in reranker result: {:?}", item))?
                as usize;
            let score = item
                .get("relevance_score")
                .and_then(|v| v.as_f64())
                .ok_or_else(|| anyhow!("Missing relevance_score in reranker result: {:?}", item))?
                as f32;
            scored.push((index, score));
        }
        Ok(scored)
    }
}

/// Reorders a fused candidate list by cross-encoder score and keeps the
/// best top_k, tagging each survivor with its rerank score.
pub struct Reranker {
    scorer: Arc<dyn RerankScorer>,
}

impl Reranker {
    pub fn new(scorer: Arc<dyn RerankScorer>) -> Self {
        Self { scorer }
    }

    pub async fn rerank(&self, query: &str, chunks: &[Chunk], top_k: usize) -> Result<Vec<Chunk>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        let passages: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut scored = self.scorer.score(query, &passages).await?;
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut reranked = Vec::with_capacity(top_k.min(scored.len()));
        for (index, score) in scored.into_iter().take(top_k) {
            let chunk = chunks
                .get(index)
                .ok_or_else(|| anyhow!("Reranker returned out-of-range index {}", index))?;
            let mut chunk = chunk.clone();
            chunk.rerank_score = Some(round4(score));
            reranked.push(chunk);
        }
        Ok(reranked)
    }
}
