#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use earningsiq_core::llm::{ChatOptions, Message, ModelProvider};
use earningsiq_core::models::{CorpusChunk, VectorHit};
use earningsiq_core::rerank::RerankScorer;
use earningsiq_core::store::VectorStore;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Vector store that replays a fixed hit list for every query and keeps its
/// corpus in memory. Counters expose how the pipeline exercised it.
pub struct FixedVectorStore {
    pub corpus: Mutex<Vec<CorpusChunk>>,
    pub hits: Vec<VectorHit>,
    pub query_count: AtomicUsize,
    pub get_all_count: AtomicUsize,
    pub last_k: AtomicUsize,
    pub last_query: Mutex<String>,
}

impl FixedVectorStore {
    pub fn new(corpus: Vec<CorpusChunk>, hits: Vec<VectorHit>) -> Self {
        Self {
            corpus: Mutex::new(corpus),
            hits,
            query_count: AtomicUsize::new(0),
            get_all_count: AtomicUsize::new(0),
            last_k: AtomicUsize::new(0),
            last_query: Mutex::new(String::new()),
        }
    }
}

#[async_trait]
impl VectorStore for FixedVectorStore {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<VectorHit>> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        self.last_k.store(k, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = text.to_string();
        Ok(self.hits.iter().take(k).cloned().collect())
    }

    async fn get_all(&self) -> Result<Vec<CorpusChunk>> {
        self.get_all_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.corpus.lock().unwrap().clone())
    }

    async fn add(&self, _ids: &[String], chunks: &[CorpusChunk]) -> Result<()> {
        self.corpus.lock().unwrap().extend_from_slice(chunks);
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.corpus.lock().unwrap().clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.corpus.lock().unwrap().len())
    }
}

/// Replays a scripted list of responses in order and records every prompt
/// it was sent. Errors once the script runs dry.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn chat(&self, messages: &[Message], _options: ChatOptions) -> Result<String> {
        let prompt = messages
            .iter()
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("scripted provider exhausted"))
    }
}

/// Deterministic cross-encoder stand-in: score is the fraction of query
/// words present in the passage.
pub struct OverlapRerankScorer;

#[async_trait]
impl RerankScorer for OverlapRerankScorer {
    async fn score(&self, query: &str, passages: &[String]) -> Result<Vec<(usize, f32)>> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Ok(passages
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let lower = p.to_lowercase();
                let found = terms.iter().filter(|t| lower.contains(t.as_str())).count();
                (i, found as f32 / terms.len().max(1) as f32)
            })
            .collect())
    }
}

pub fn corpus_chunk(text: &str, source: &str) -> CorpusChunk {
    CorpusChunk {
        text: text.to_string(),
        source: source.to_string(),
    }
}

pub fn hit(text: &str, source: &str, distance: f32) -> VectorHit {
    VectorHit {
        text: text.to_string(),
        source: source.to_string(),
        distance,
    }
}
