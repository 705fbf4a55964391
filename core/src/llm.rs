use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Per-call knobs; each pipeline stage carries its own temperature and
/// output budget.
#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: None,
        }
    }
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<String>;
}

/// Chat-completions client. Defaults to OpenAI when OPENAI_API_KEY is set,
/// otherwise to a local Ollama endpoint; LLM_API_BASE and LLM_MODEL override.
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl OpenAIProvider {
    pub fn new(model: Option<String>, timeout_secs: u64) -> Result<Self> {
        let openai_key = env::var("OPENAI_API_KEY").ok();

        let (default_url, default_model, api_key) = if let Some(k) = openai_key {
            ("https://api.openai.com/v1", "gpt-4o-mini", k)
        } else {
            (
                "http://localhost:11434/v1",
                "llama3.1:8b",
                "dummy".to_string(),
            )
        };

        let api_url = env::var("LLM_API_BASE").unwrap_or_else(|_| default_url.to_string());
        let model = model
            .or_else(|| env::var("LLM_MODEL").ok())
            .unwrap_or_else(|| default_model.to_string());

        if api_url.contains("openai.com") && api_key == "dummy" {
            return Err(anyhow!(
                "OPENAI_API_KEY environment variable not set for OpenAI URL"
            ));
        }

        let endpoint = if api_url.ends_with("/chat/completions") {
            api_url
        } else {
            format!("{}/chat/completions", api_url.trim_end_matches('/'))
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            api_url: endpoint,
        })
    }
}

#[async_trait]
impl ModelProvider for OpenAIProvider {
    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<String> {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": options.temperature,
        });
        if let Some(mt) = options.max_tokens {
            body["max_tokens"] = serde_json::json!(mt);
        }

        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow!("LLM API error: {} - {}", status, text));
        }

        let json: serde_json::Value = res.json().await?;

        if let Some(error) = json.get("error") {
            return Err(anyhow!("LLM API returned error: {}", error));
        }

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| anyhow!("Invalid response format: missing content in choices"))
    }
}
