//! OpenAI-compatible HTTP backends: chat completions for the oracle and
//! embeddings for top-down feature names.

use anyhow::{Context as AnyhowContext, Result};
use async_trait::async_trait;
use context_corpus::{CorpusError, Embedder};
use context_features::{ChatModel, FeatureError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-large";

/// Endpoint settings read from `CONTEXT_LLM_*` variables
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub chat_model: String,
    pub embed_model: String,
}

impl BackendConfig {
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            base_url: non_empty("CONTEXT_LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: non_empty("CONTEXT_LLM_API_KEY").or_else(|| non_empty("OPENAI_API_KEY")),
            chat_model: non_empty("CONTEXT_LLM_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            embed_model: non_empty("CONTEXT_EMBED_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBED_MODEL.to_string()),
        }
    }

    fn client(timeout: Duration) -> Result<Client> {
        Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")
    }

    fn api_key(&self) -> std::result::Result<&str, String> {
        self.api_key
            .as_deref()
            .ok_or_else(|| "no API key: set CONTEXT_LLM_API_KEY or OPENAI_API_KEY".to_string())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions [`ChatModel`]
pub struct HttpChatModel {
    client: Client,
    config: BackendConfig,
}

impl HttpChatModel {
    pub fn new(config: BackendConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: BackendConfig::client(timeout)?,
            config,
        })
    }

    async fn request(&self, prompt: &str) -> std::result::Result<String, String> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = ChatRequest {
            model: &self.config.chat_model,
            temperature: 0.0,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response: ChatResponse = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("POST {url}: {e}"))?
            .error_for_status()
            .map_err(|e| format!("POST {url}: {e}"))?
            .json()
            .await
            .map_err(|e| format!("Invalid chat response from {url}: {e}"))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| format!("Empty chat response from {url}"))
    }
}

#[async_trait]
impl ChatModel for HttpChatModel {
    async fn complete(&self, prompt: &str) -> context_features::Result<String> {
        self.request(prompt).await.map_err(FeatureError::oracle)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embeddings-endpoint [`Embedder`]
pub struct HttpEmbedder {
    client: Client,
    config: BackendConfig,
}

impl HttpEmbedder {
    pub fn new(config: BackendConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: BackendConfig::client(timeout)?,
            config,
        })
    }

    async fn request(&self, text: &str) -> std::result::Result<Vec<f32>, String> {
        let url = format!("{}/embeddings", self.config.base_url);
        let body = EmbeddingRequest {
            model: &self.config.embed_model,
            input: text,
        };
        let response: EmbeddingResponse = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("POST {url}: {e}"))?
            .error_for_status()
            .map_err(|e| format!("POST {url}: {e}"))?
            .json()
            .await
            .map_err(|e| format!("Invalid embedding response from {url}: {e}"))?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| format!("Empty embedding response from {url}"))
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> context_corpus::Result<Vec<f32>> {
        self.request(text).await.map_err(CorpusError::EmbeddingError)
    }
}
