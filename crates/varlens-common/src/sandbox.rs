use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use crate::error::VarlensError;

/// Desktop-browser identity sent with every request. Some article hosts
/// refuse clients that do not look like a browser.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Transport knobs for [`SandboxClient`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    /// `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    pub extra_allowed_domains: Vec<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout: None,
            extra_allowed_domains: Vec::new(),
        }
    }
}

/// An HTTP client that only talks to approved domains.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a client with default settings and the default allowlist.
    pub fn new() -> Result<Self, VarlensError> {
        Self::with_settings(&HttpSettings::default())
    }

    pub fn with_settings(settings: &HttpSettings) -> Result<Self, VarlensError> {
        let domains = [
            "pmc.ncbi.nlm.nih.gov",       // PMC article pages
            "www.ncbi.nlm.nih.gov",       // legacy PMC article pages
            "api.omim.org",               // OMIM entries
            "api.openai.com",             // chatgpt alias
            "api.anthropic.com",          // claude alias
            "ark.cn-beijing.volces.com",  // doubao / kimi aliases
            "localhost",                  // annotation service
            "127.0.0.1",
        ];

        let mut allowlist: HashSet<String> = domains.iter().map(|d| d.to_string()).collect();
        allowlist.extend(settings.extra_allowed_domains.iter().cloned());

        let mut builder = ClientBuilder::new().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| VarlensError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        // Exact match or a subdomain of an allowed domain
        self.allowlist
            .iter()
            .any(|allowed| host == allowed || host.ends_with(&format!(".{}", allowed)))
    }

    fn check(&self, url: &str) -> Result<(), VarlensError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(VarlensError::SecurityError(format!(
                "domain not in allowlist for URL {}",
                url
            )))
        }
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, VarlensError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, VarlensError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }

    /// Single GET attempt; any non-2xx status becomes [`VarlensError::HttpStatus`].
    pub async fn fetch_text(&self, url: &str) -> Result<String, VarlensError> {
        let resp = self.get(url)?.send().await?;
        let resp = ensure_success(resp)?;
        let body = resp.text().await?;
        debug!(url, bytes = body.len(), "fetched document");
        Ok(body)
    }
}

/// Maps a non-2xx response to [`VarlensError::HttpStatus`].
pub fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, VarlensError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    warn!(status = status.as_u16(), %url, "non-success HTTP status");
    Err(VarlensError::HttpStatus { status: status.as_u16(), url })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowlist_covers_pmc_and_localhost() {
        let client = SandboxClient::new().unwrap();
        assert!(client.is_allowed("https://pmc.ncbi.nlm.nih.gov/articles/PMC5938503/"));
        assert!(client.is_allowed("http://localhost:5001/annotate"));
        assert!(client.is_allowed("http://127.0.0.1:8080/x"));
    }

    #[test]
    fn test_subdomain_is_allowed_but_lookalike_is_not() {
        let client = SandboxClient::new().unwrap();
        assert!(client.is_allowed("https://eu.api.openai.com/v1"));
        assert!(!client.is_allowed("https://evilapi.openai.com.example.org/"));
        assert!(!client.is_allowed("not a url"));
    }

    #[test]
    fn test_extra_domains_from_settings() {
        let settings = HttpSettings {
            extra_allowed_domains: vec!["europepmc.org".to_string()],
            ..Default::default()
        };
        let mut client = SandboxClient::with_settings(&settings).unwrap();
        assert!(client.is_allowed("https://europepmc.org/article/PMC/PMC1"));
        assert!(!client.is_allowed("https://example.com/"));
        client.allow_domain("example.com");
        assert!(client.is_allowed("https://example.com/"));
    }

    #[tokio::test]
    async fn test_blocked_domain_fails_before_network() {
        let client = SandboxClient::new().unwrap();
        let err = client.fetch_text("https://example.com/PMC1").await.unwrap_err();
        assert!(matches!(err, VarlensError::SecurityError(_)));
    }
}
