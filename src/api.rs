use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::error::PreviewError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{provider} API request failed with status {status}: {body}")]
    Api { provider: &'static str, status: u16, body: String },
    #[error("{provider} returned no text: {reason}")]
    EmptyResponse { provider: &'static str, reason: String },
}

/// Submits one prompt and returns the model's raw text. A single attempt.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AIProvider {
    Gemini,
    OpenAI,
    Ollama,
}

impl AIProvider {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            AIProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            AIProvider::OpenAI => "https://api.openai.com/v1",
            AIProvider::Ollama => "http://localhost:11434",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AIProvider::Gemini => "Gemini",
            AIProvider::OpenAI => "OpenAI",
            AIProvider::Ollama => "Ollama",
        }
    }
}

impl FromStr for AIProvider {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(AIProvider::Gemini),
            "openai" => Ok(AIProvider::OpenAI),
            "ollama" => Ok(AIProvider::Ollama),
            other => Err(PreviewError::Configuration(format!("unknown AI provider `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    pub provider: AIProvider,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ApiClient {
    pub fn new(
        provider: AIProvider,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("smart-preview/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ModelError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            provider,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    async fn send_gemini_request(&self, prompt: &str) -> Result<String, ModelError> {
        let request = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.7 }
        });

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.endpoint, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let body: GeminiResponse = response.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        self.non_empty(text, "no candidate text in response")
    }

    async fn send_openai_request(&self, prompt: &str) -> Result<String, ModelError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage { role: "user".to_string(), content: prompt.to_string() }],
            temperature: 0.7,
        };

        let mut request_builder =
            self.client.post(format!("{}/chat/completions", self.endpoint)).json(&request);
        if !self.api_key.is_empty() {
            request_builder = request_builder.bearer_auth(&self.api_key);
        }

        let response = self.check_status(request_builder.send().await?).await?;
        let body: OpenAIResponse = response.json().await?;
        let text = body.choices.into_iter().next().map(|c| c.message.content).unwrap_or_default();
        self.non_empty(text, "no choices in response")
    }

    async fn send_ollama_request(&self, prompt: &str) -> Result<String, ModelError> {
        let request = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": 0.7 }
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .json(&request)
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let body: Value = response.json().await?;
        let text = body["response"].as_str().unwrap_or_default().to_string();
        self.non_empty(text, "missing `response` field")
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, ModelError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        error!("{} API error: {} - {}", self.provider.label(), status, body);
        Err(ModelError::Api { provider: self.provider.label(), status, body })
    }

    fn non_empty(&self, text: String, reason: &str) -> Result<String, ModelError> {
        if text.trim().is_empty() {
            Err(ModelError::EmptyResponse { provider: self.provider.label(), reason: reason.to_string() })
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl ModelClient for ApiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        debug!(provider = self.provider.label(), model = %self.model, chars = prompt.len(), "sending prompt");
        match self.provider {
            AIProvider::Gemini => self.send_gemini_request(prompt).await,
            AIProvider::OpenAI => self.send_openai_request(prompt).await,
            AIProvider::Ollama => self.send_ollama_request(prompt).await,
        }
    }
}
