use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

pub mod external;
pub mod ollama;

pub use external::ExternalEmbedder;
pub use ollama::OllamaEmbedder;
