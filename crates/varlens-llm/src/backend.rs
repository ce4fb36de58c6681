//! LLM backend trait and concrete implementations.
//!
//! Backends:
//!   OpenAiCompatibleBackend  chat-completions endpoints (OpenAI, Volcengine Ark)
//!   AnthropicBackend         Anthropic Messages API (claude-*)
//!
//! All requests go through the allow-listed [`SandboxClient`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use varlens_common::{SandboxClient, VarlensError};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
    #[error("Unsupported LLM alias: {0}")]
    UnsupportedAlias(String),
    #[error("No API key for '{alias}': set {env_var}")]
    MissingApiKey { alias: String, env_var: String },
    #[error("Prompt variable has no value: {0}")]
    MissingVariable(String),
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error(transparent)]
    Client(#[from] VarlensError),
}

pub type Result<T> = std::result::Result<T, LlmError>;

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,   // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// A single user turn with default sampling.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self { messages: vec![Message::user(prompt)], ..Default::default() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse>;
    fn model_id(&self) -> &str;
    fn max_context_tokens(&self) -> usize;
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_openai_response(json: &serde_json::Value, fallback_model: &str) -> LlmResponse {
    LlmResponse {
        content: json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        model: json["model"]
            .as_str()
            .unwrap_or(fallback_model)
            .to_string(),
        prompt_tokens:     json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    }
}

/// Decodes the body, turning 4xx/5xx into [`LlmError::ApiError`].
///
/// Error bodies that are not JSON are reported verbatim.
async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    if status >= 400 {
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|body| {
                body["error"]["message"]
                    .as_str()
                    .or_else(|| body["message"].as_str())
                    .map(str::to_string)
            })
            .unwrap_or(text);
        return Err(LlmError::ApiError { status, message });
    }
    Ok(serde_json::from_str(&text)?)
}

// ── 1. OpenAI-compatible (chatgpt, doubao, kimi) ──────────────────────────────

pub struct OpenAiCompatibleBackend {
    /// Versioned API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    api_key: String,
    client: SandboxClient,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        client: SandboxClient,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model":       req.model.as_deref().unwrap_or(&self.model),
            "messages":    req.messages,
            "max_tokens":  req.max_tokens.unwrap_or(4096),
            "temperature": req.temperature.unwrap_or(0.0),
        });
        let resp = self.client
            .post(&url)?
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;
        let response = parse_openai_response(&json, &self.model);
        debug!(
            model = %response.model,
            prompt_tokens = response.prompt_tokens,
            completion_tokens = response.completion_tokens,
            "chat completion received"
        );
        Ok(response)
    }

    fn model_id(&self) -> &str { &self.model }
    fn max_context_tokens(&self) -> usize { 128_000 }
}

// ── 2. Anthropic (claude-*) ───────────────────────────────────────────────────

pub struct AnthropicBackend {
    pub base_url: String,
    pub model: String,
    api_key: String,
    client: SandboxClient,
}

impl AnthropicBackend {
    pub fn new(client: SandboxClient, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: ANTHROPIC_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse> {
        // System prompt travels outside the message list
        let system = req.messages.iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .unwrap_or("");

        let messages: Vec<serde_json::Value> = req.messages.iter()
            .filter(|m| m.role != "system")
            .map(|m| serde_json::json!({"role": m.role, "content": m.content}))
            .collect();

        let model = req.model.as_deref().unwrap_or(&self.model);

        let mut body = serde_json::json!({
            "model":       model,
            "messages":    messages,
            "max_tokens":  req.max_tokens.unwrap_or(4096),
            "temperature": req.temperature.unwrap_or(0.0),
        });
        if !system.is_empty() {
            body["system"] = serde_json::Value::String(system.to_string());
        }

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let resp = self.client
            .post(&url)?
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let json = check_response_status(resp).await?;

        let content = json["content"]
            .as_array()
            .map(|blocks| {
                blocks.iter()
                    .filter_map(|b| b["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: json["model"].as_str().unwrap_or(model).to_string(),
            prompt_tokens:     json["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32,
            completion_tokens: json["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32,
        })
    }

    fn model_id(&self) -> &str { &self.model }
    fn max_context_tokens(&self) -> usize { 200_000 }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_openai_response() {
        let json = json!({
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"message": {"role": "assistant", "content": "PVS1 applies."}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 4}
        });
        let resp = parse_openai_response(&json, "gpt-4o-mini");
        assert_eq!(resp.content, "PVS1 applies.");
        assert_eq!(resp.model, "gpt-4o-mini-2024-07-18");
        assert_eq!(resp.prompt_tokens, 120);
    }

    #[test]
    fn test_parse_openai_response_falls_back_on_missing_fields() {
        let resp = parse_openai_response(&json!({}), "ep-model");
        assert_eq!(resp.content, "");
        assert_eq!(resp.model, "ep-model");
        assert_eq!(resp.completion_tokens, 0);
    }

    #[test]
    fn test_backend_model_ids() {
        let client = SandboxClient::new().unwrap();
        let openai = OpenAiCompatibleBackend::new(client.clone(), OPENAI_BASE_URL, "gpt-4o-mini", "sk-test");
        assert_eq!(openai.model_id(), "gpt-4o-mini");
        let claude = AnthropicBackend::new(client, "sk-ant-test", "claude-3-5-sonnet-20241022");
        assert_eq!(claude.model_id(), "claude-3-5-sonnet-20241022");
        assert_eq!(claude.max_context_tokens(), 200_000);
    }

    #[tokio::test]
    async fn test_blocked_host_never_sent() {
        let backend = OpenAiCompatibleBackend::new(
            SandboxClient::new().unwrap(),
            "https://llm.example.com/v1",
            "m",
            "k",
        );
        let err = backend.complete(LlmRequest::from_prompt("hi")).await.unwrap_err();
        assert!(matches!(err, LlmError::Client(VarlensError::SecurityError(_))));
    }
}
