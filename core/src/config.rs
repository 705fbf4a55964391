use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub crag: CragConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub rerank: RerankConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(None)
    }

    pub fn load_from(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        let config_path = path.unwrap_or_else(|| std::path::Path::new(".earningsiq.yml"));
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Candidate pool pulled by hybrid retrieval before reranking.
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,
    /// Candidates kept after the cross-encoder pass.
    #[serde(default = "default_rerank_top_k")]
    pub rerank_top_k: usize,
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f32,
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            candidate_pool: default_candidate_pool(),
            rerank_top_k: default_rerank_top_k(),
            vector_weight: default_vector_weight(),
            lexical_weight: default_lexical_weight(),
        }
    }
}

/// Thresholds of the corrective loop. The decision rule counts grades over
/// `graded_top_k` chunks, so these move together with `rerank_top_k`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CragConfig {
    #[serde(default = "default_graded_top_k")]
    pub graded_top_k: usize,
    /// This many IRRELEVANT grades reject the result set.
    #[serde(default = "default_irrelevant_threshold")]
    pub irrelevant_threshold: usize,
    /// Wider pool used for the corrective re-retrieval.
    #[serde(default = "default_corrected_pool_k")]
    pub corrected_pool_k: usize,
}

impl Default for CragConfig {
    fn default() -> Self {
        Self {
            graded_top_k: default_graded_top_k(),
            irrelevant_threshold: default_irrelevant_threshold(),
            corrected_pool_k: default_corrected_pool_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat model; falls back to LLM_MODEL, then a provider default.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub backend: EmbeddingBackend,
    /// Provider default when unset (nomic-embed-text / text-embedding-3-small).
    #[serde(default)]
    pub model_name: Option<String>,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Ollama,
            model_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    External,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    #[serde(default = "default_rerank_model")]
    pub model: String,
    /// Base URL of the cross-encoder service; RERANK_API_BASE overrides.
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            model: default_rerank_model(),
            api_base: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Chroma base URL; CHROMA_BASE_URL overrides.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            collection: default_collection(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Words per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Word overlap between consecutive chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Tail windows at or below this many words are dropped.
    #[serde(default = "default_min_chunk_words")]
    pub min_chunk_words: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            min_chunk_words: default_min_chunk_words(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_candidate_pool() -> usize {
    20
}

fn default_rerank_top_k() -> usize {
    3
}

fn default_vector_weight() -> f32 {
    0.6
}

fn default_lexical_weight() -> f32 {
    0.4
}

fn default_graded_top_k() -> usize {
    3
}

fn default_irrelevant_threshold() -> usize {
    2
}

fn default_corrected_pool_k() -> usize {
    20
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_rerank_model() -> String {
    "ms-marco-MiniLM-L-12-v2".to_string()
}

fn default_collection() -> String {
    "transcripts".to_string()
}

fn default_data_dir() -> String {
    "data/transcripts".to_string()
}

fn default_chunk_size() -> usize {
    400
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_min_chunk_words() -> usize {
    80
}

fn default_batch_size() -> usize {
    100
}
