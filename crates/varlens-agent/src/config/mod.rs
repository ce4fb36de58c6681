//! Configuration loading for Varlens.
//! Reads varlens.toml from the current directory or path in VARLENS_CONFIG env var.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use varlens_common::{HttpSettings, BROWSER_USER_AGENT};


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub annotation: AnnotationConfig,
    #[serde(default)]
    pub omim: OmimConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Unset keeps the transport default.
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub extra_allowed_domains: Vec<String>,
}

fn default_user_agent() -> String { BROWSER_USER_AGENT.to_string() }

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: None,
            extra_allowed_domains: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    #[serde(default = "default_annotation_url")]
    pub url: String,
}

fn default_annotation_url() -> String { "http://localhost:5001/annotate".to_string() }

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self { url: default_annotation_url() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmimConfig {
    /// Name of the env var holding the key, not the key itself.
    #[serde(default = "default_omim_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_omim_base_url")]
    pub base_url: String,
}

fn default_omim_key_env()  -> String { "OMIM_API_KEY".to_string() }
fn default_omim_base_url() -> String { "https://api.omim.org/api/entry".to_string() }

impl Default for OmimConfig {
    fn default() -> Self {
        Self { api_key_env: default_omim_key_env(), base_url: default_omim_base_url() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_gene_db")]
    pub gene_db: PathBuf,
    #[serde(default = "default_transcript_db")]
    pub transcript_db: PathBuf,
}

fn default_gene_db()       -> PathBuf { PathBuf::from("data/gene_db.json") }
fn default_transcript_db() -> PathBuf { PathBuf::from("data/transcript_db.json") }

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self { gene_db: default_gene_db(), transcript_db: default_transcript_db() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_alias")]
    pub default_alias: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_alias()       -> String { "claude".to_string() }
fn default_temperature() -> f32    { 0.0 }
fn default_max_tokens()  -> u32    { 4096 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_alias: default_alias(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Config {
    /// Load configuration from varlens.toml.
    /// Checks VARLENS_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("VARLENS_CONFIG")
            .unwrap_or_else(|_| "varlens.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    /// A missing file yields the built-in defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!(
                path = %path.display(),
                "Config file not found, using defaults (copy varlens.example.toml to varlens.toml to customise)"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            user_agent: self.http.user_agent.clone(),
            timeout: self.http.timeout_secs.map(Duration::from_secs),
            extra_allowed_domains: self.http.extra_allowed_domains.clone(),
        }
    }

    /// OMIM key from the configured env var, if set and non-empty.
    pub fn omim_api_key(&self) -> Option<String> {
        std::env::var(&self.omim.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}
