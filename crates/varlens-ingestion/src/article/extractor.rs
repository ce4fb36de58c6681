//! Fetch-and-parse entry points for PMC article pages.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;
use tracing::{info, instrument};
use varlens_common::{Result, SandboxClient, VarlensError};

use crate::dom::ScraperNode;
use super::fields::assemble;
use super::model::Article;

lazy_static! {
    static ref PMC_ACCESSION: Regex = Regex::new(r"PMC\d+").unwrap();
}

/// Returns the first PMC accession (`PMC` followed by digits) in `url`.
///
/// Runs before any network I/O; a URL without an accession is rejected
/// with [`VarlensError::InvalidIdentifier`].
pub fn identify(url: &str) -> Result<String> {
    PMC_ACCESSION
        .find(url)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| VarlensError::InvalidIdentifier(url.to_string()))
}

/// Parses an already-fetched page into an [`Article`].
pub fn parse_article(pmcid: String, html: &str) -> Article {
    let document = Html::parse_document(html);
    assemble(pmcid, ScraperNode::from(document.root_element()))
}

/// Same contract as [`ArticleExtractor::extract`] without the network call.
pub fn extract_html(url: &str, html: &str) -> Result<Article> {
    let pmcid = identify(url)?;
    Ok(parse_article(pmcid, html))
}

/// Extracts PMC articles over HTTP.
///
/// Holds no per-article state; a single extractor can serve concurrent callers.
pub struct ArticleExtractor {
    client: SandboxClient,
}

impl ArticleExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self { client: SandboxClient::new()? })
    }

    pub fn with_client(client: SandboxClient) -> Self {
        Self { client }
    }

    /// Identifies, fetches (single attempt) and parses the article at `url`.
    ///
    /// Identification and transport failures are returned as errors; a
    /// missing optional region only empties that field. The article host
    /// must be on the client's allowlist (PMC by default, extended through
    /// `http.extra_allowed_domains`), otherwise the request is never sent
    /// and [`VarlensError::SecurityError`] is returned.
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> Result<Article> {
        let pmcid = identify(url)?;
        let html = self.client.fetch_text(url).await?;
        let article = parse_article(pmcid, &html);
        info!(
            pmcid = %article.pmcid,
            sections = article.sections.len(),
            "article extracted"
        );
        Ok(article)
    }

    /// [`extract`](Self::extract) followed by [`Article::to_plain_text`].
    pub async fn extract_plain_text(&self, url: &str) -> Result<String> {
        Ok(self.extract(url).await?.to_plain_text())
    }
}
