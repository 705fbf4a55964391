use serde::{Deserialize, Serialize};

/// Number of leading characters that identify a chunk during fusion.
/// Chunks with identical openings collapse into one record.
pub const MERGE_KEY_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelevanceGrade {
    Relevant,
    Irrelevant,
    Ambiguous,
}

impl RelevanceGrade {
    /// Maps raw judge output onto a grade. IRRELEVANT wins over RELEVANT
    /// (the former contains the latter as a substring); anything that is
    /// neither lands on Ambiguous.
    pub fn parse(raw: &str) -> Self {
        let label = raw.trim().to_uppercase();
        if label.contains("IRRELEVANT") {
            RelevanceGrade::Irrelevant
        } else if label.contains("RELEVANT") {
            RelevanceGrade::Relevant
        } else {
            RelevanceGrade::Ambiguous
        }
    }
}

impl std::fmt::Display for RelevanceGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RelevanceGrade::Relevant => "RELEVANT",
            RelevanceGrade::Irrelevant => "IRRELEVANT",
            RelevanceGrade::Ambiguous => "AMBIGUOUS",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CragStatus {
    Passed,
    Corrected,
}

impl std::fmt::Display for CragStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CragStatus::Passed => "PASSED",
            CragStatus::Corrected => "CORRECTED",
        };
        write!(f, "{}", name)
    }
}

/// A transcript passage moving through the pipeline. Score fields are filled
/// in stage by stage; `source` is fixed at ingestion ("TICKER | YYYY-Mon-DD").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub vector_score: Option<f32>,
    pub bm25_score: Option<f32>,
    pub hybrid_score: Option<f32>,
    pub rerank_score: Option<f32>,
    pub relevance_grade: Option<RelevanceGrade>,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            vector_score: None,
            bm25_score: None,
            hybrid_score: None,
            rerank_score: None,
            relevance_grade: None,
        }
    }

    pub fn merge_key(&self) -> &str {
        merge_key(&self.text)
    }
}

/// First `MERGE_KEY_LEN` characters of the text.
pub fn merge_key(text: &str) -> &str {
    match text.char_indices().nth(MERGE_KEY_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Round to the precision retrieval scores are reported at.
pub fn round4(x: f32) -> f32 {
    (x * 10_000.0).round() / 10_000.0
}

/// Raw result from the vector store, distance still unconverted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorHit {
    pub text: String,
    pub source: String,
    pub distance: f32,
}

/// One entry of the corpus snapshot the lexical index is built over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusChunk {
    pub text: String,
    pub source: String,
}

/// A loaded transcript before chunking.
#[derive(Debug, Clone)]
pub struct TranscriptDoc {
    pub text: String,
    pub source: String,
    pub filename: String,
}

/// Everything one pipeline run produced, bundled for the consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub original_query: String,
    pub rewritten_query: String,
    pub reranked_chunks: Vec<Chunk>,
    pub final_chunks: Vec<Chunk>,
    pub crag_status: CragStatus,
    pub answer: String,
}
