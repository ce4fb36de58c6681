//! Client for the local variant-annotation service.
//!
//! Endpoint: POST {url} with `{"genome_version": "hg38", "position": "chr2-31754395-C-T"}`.
//! The service wraps its JSON payload in a string field:
//! `{"result": "{\"transcript_consequences\": [...], ...}"}`.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use varlens_common::{ensure_success, Result, SandboxClient, VarlensError};

use crate::normalise::{GenomeBuild, GenomicPosition};

pub const DEFAULT_ANNOTATION_URL: &str = "http://localhost:5001/annotate";

#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    genome_version: &'a str,
    position: String,
}

pub struct AnnotationClient {
    client: SandboxClient,
    url: String,
}

impl AnnotationClient {
    pub fn new(client: SandboxClient) -> Self {
        Self { client, url: DEFAULT_ANNOTATION_URL.to_string() }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    /// Annotates one variant; returns the decoded annotation payload.
    #[instrument(skip_all, fields(build = %build, position = %position))]
    pub async fn annotate(&self, build: GenomeBuild, position: &GenomicPosition) -> Result<Value> {
        let request = AnnotateRequest {
            genome_version: build.as_str(),
            position: position.to_string(),
        };

        let resp = self.client.post(&self.url)?.json(&request).send().await?;
        let body: Value = ensure_success(resp)?.json().await?;
        let annotation = decode_envelope(body)?;

        debug!(
            consequences = annotation["transcript_consequences"].as_array().map_or(0, Vec::len),
            "annotation received"
        );
        Ok(annotation)
    }
}

/// Unwraps the service's `result` field.
///
/// The payload is normally a JSON-encoded string; an inline object is
/// accepted as well.
pub fn decode_envelope(body: Value) -> Result<Value> {
    match body.get("result") {
        Some(Value::String(encoded)) => Ok(serde_json::from_str(encoded)?),
        Some(inline @ Value::Object(_)) => Ok(inline.clone()),
        _ => Err(VarlensError::NotFound("result".to_string())),
    }
}

/// The transcript consequence the annotator flagged with `pick == 1`.
pub fn picked_consequence(annotation: &Value) -> Option<&Value> {
    annotation["transcript_consequences"]
        .as_array()?
        .iter()
        .find(|c| c["pick"].as_i64() == Some(1))
}
