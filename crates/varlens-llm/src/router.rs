//! Model alias registry.
//!
//! Workflows select a model by short alias; the registry maps it to a
//! provider endpoint, a concrete model id and the env var holding the key.

use std::sync::Arc;

use tracing::info;
use varlens_common::SandboxClient;

use crate::backend::{AnthropicBackend, LlmBackend, LlmError, OpenAiCompatibleBackend, Result, OPENAI_BASE_URL};

/// Volcengine Ark, OpenAI-compatible.
pub const ARK_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Ark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAlias {
    pub alias: &'static str,
    pub provider: Provider,
    pub model: &'static str,
    pub key_env: &'static str,
}

pub const MODEL_ALIASES: [ModelAlias; 4] = [
    ModelAlias {
        alias: "chatgpt",
        provider: Provider::OpenAi,
        model: "gpt-4o-mini",
        key_env: "OPENAI_API_KEY",
    },
    ModelAlias {
        alias: "claude",
        provider: Provider::Anthropic,
        model: "claude-3-5-sonnet-20241022",
        key_env: "ANTHROPIC_API_KEY",
    },
    // Ark endpoints are deployment ids, not model names
    ModelAlias {
        alias: "doubao",
        provider: Provider::Ark,
        model: "ep-20240821102124-nl9ck",
        key_env: "ARK_API_KEY",
    },
    ModelAlias {
        alias: "kimi",
        provider: Provider::Ark,
        model: "ep-20241203161719-mpv8s",
        key_env: "ARK_API_KEY",
    },
];

/// Case-insensitive alias lookup.
pub fn resolve_alias(alias: &str) -> Result<&'static ModelAlias> {
    let wanted = alias.trim().to_lowercase();
    MODEL_ALIASES
        .iter()
        .find(|m| m.alias == wanted)
        .ok_or_else(|| LlmError::UnsupportedAlias(alias.to_string()))
}

pub fn alias_names() -> Vec<&'static str> {
    MODEL_ALIASES.iter().map(|m| m.alias).collect()
}

/// Builds the backend for `alias`, reading its key from the environment.
pub fn build_backend(alias: &str, client: SandboxClient) -> Result<Arc<dyn LlmBackend>> {
    build_backend_with(alias, client, |name| std::env::var(name).ok())
}

/// Same as [`build_backend`] with an explicit key source.
pub fn build_backend_with<F>(alias: &str, client: SandboxClient, key_lookup: F) -> Result<Arc<dyn LlmBackend>>
where
    F: Fn(&str) -> Option<String>,
{
    let entry = resolve_alias(alias)?;
    let api_key = key_lookup(entry.key_env)
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| LlmError::MissingApiKey {
            alias: entry.alias.to_string(),
            env_var: entry.key_env.to_string(),
        })?;

    info!(alias = entry.alias, model = entry.model, "LLM backend selected");

    let backend: Arc<dyn LlmBackend> = match entry.provider {
        Provider::OpenAi => Arc::new(OpenAiCompatibleBackend::new(client, OPENAI_BASE_URL, entry.model, api_key)),
        Provider::Ark => Arc::new(OpenAiCompatibleBackend::new(client, ARK_BASE_URL, entry.model, api_key)),
        Provider::Anthropic => Arc::new(AnthropicBackend::new(client, api_key, entry.model)),
    };
    Ok(backend)
}
