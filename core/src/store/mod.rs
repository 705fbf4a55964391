use crate::models::{CorpusChunk, VectorHit};
use anyhow::Result;
use async_trait::async_trait;

/// Boundary to the external embedding store. The pipeline only ever sees
/// this trait; the Chroma client below is the production implementation.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Top-k nearest chunks for a query text, raw distances included.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<VectorHit>>;

    /// Full corpus snapshot (documents plus source metadata), used to build
    /// the lexical index.
    async fn get_all(&self) -> Result<Vec<CorpusChunk>>;

    async fn add(&self, ids: &[String], chunks: &[CorpusChunk]) -> Result<()>;

    /// Drops and lazily recreates the collection.
    async fn reset(&self) -> Result<()>;

    async fn count(&self) -> Result<usize>;
}

pub mod chroma;

pub use chroma::ChromaStore;
