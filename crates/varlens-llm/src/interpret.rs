//! One call per interpretation workflow.
//!
//! Each workflow renders its built-in template, sends a single user turn and
//! returns the model's markdown answer unchanged.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use crate::backend::{LlmBackend, LlmRequest, Message, Result};
use crate::prompt::{PromptTemplate, ACMG_CLASSIFIER, GENE_DESCRIPTION, PAPER_READER, PVS1_EXPERT};

#[derive(Debug, Clone, Copy)]
pub struct SamplingSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self { temperature: 0.0, max_tokens: 4096 }
    }
}

pub struct Interpreter {
    backend: Arc<dyn LlmBackend>,
    sampling: SamplingSettings,
}

impl Interpreter {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend, sampling: SamplingSettings::default() }
    }

    pub fn with_sampling(mut self, sampling: SamplingSettings) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }

    pub fn max_context_tokens(&self) -> usize {
        self.backend.max_context_tokens()
    }

    /// ACMG evidence for `variant` from a flattened article.
    #[instrument(skip(self, article_text))]
    pub async fn interpret_article(&self, article_text: &str, variant: &str) -> Result<String> {
        self.run(
            "paper_reader",
            PAPER_READER,
            &[("pubmed_article", article_text), ("genetic_variant", variant)],
        )
        .await
    }

    /// Gene-disease description from an OMIM phenotype table and narrative.
    #[instrument(skip_all)]
    pub async fn describe_gene(&self, phenotype_table: &str, molecular_genetics: &str) -> Result<String> {
        self.run(
            "gene_description",
            GENE_DESCRIPTION,
            &[("phenotype", phenotype_table), ("molecular_genetics", molecular_genetics)],
        )
        .await
    }

    #[instrument(skip(self, annotation))]
    pub async fn classify_variant(&self, annotation: &Value, variant: &str) -> Result<String> {
        let annotation = serde_json::to_string_pretty(annotation)?;
        self.run(
            "acmg_classifier",
            ACMG_CLASSIFIER,
            &[("annotation", &annotation), ("genetic_variant", variant)],
        )
        .await
    }

    #[instrument(skip_all)]
    pub async fn justify_pvs1(&self, variant_annotation: &Value, gene: &Value, transcript: &Value) -> Result<String> {
        let variant_annotation = serde_json::to_string_pretty(variant_annotation)?;
        let gene = serde_json::to_string_pretty(gene)?;
        let transcript = serde_json::to_string_pretty(transcript)?;
        self.run(
            "pvs1_expert",
            PVS1_EXPERT,
            &[
                ("variant_annotation", &variant_annotation),
                ("gene_annotation", &gene),
                ("transcript_annotation", &transcript),
            ],
        )
        .await
    }

    async fn run(&self, workflow: &str, template: &str, values: &[(&str, &str)]) -> Result<String> {
        let prompt = PromptTemplate::new(template).render(values)?;
        let req = LlmRequest {
            messages: vec![Message::user(prompt)],
            model: None,
            max_tokens: Some(self.sampling.max_tokens),
            temperature: Some(self.sampling.temperature),
        };

        let resp = self.backend.complete(req).await?;
        info!(
            workflow,
            model = %resp.model,
            prompt_tokens = resp.prompt_tokens,
            completion_tokens = resp.completion_tokens,
            "interpretation complete"
        );
        Ok(resp.content)
    }
}
