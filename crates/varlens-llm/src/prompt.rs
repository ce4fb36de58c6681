//! Prompt templates rendered with minijinja.
//!
//! Placeholders use Jinja syntax (`{{ name }}`). Rendering is strict: a
//! placeholder without a value is an error rather than an empty string.

use std::collections::BTreeMap;

use minijinja::{Environment, UndefinedBehavior};

use crate::backend::{LlmError, Result};

fn environment<'s>() -> Environment<'s> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
}

impl PromptTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names, sorted.
    pub fn variables(&self) -> Result<Vec<String>> {
        let env = environment();
        let template = env.template_from_str(&self.source)?;
        let mut names: Vec<String> = template.undeclared_variables(false).into_iter().collect();
        names.sort();
        Ok(names)
    }

    /// Substitutes every placeholder; unused values are ignored.
    pub fn render(&self, values: &[(&str, &str)]) -> Result<String> {
        if let Some(missing) = self
            .variables()?
            .into_iter()
            .find(|name| !values.iter().any(|(key, _)| *key == name.as_str()))
        {
            return Err(LlmError::MissingVariable(missing));
        }

        let env = environment();
        let template = env.template_from_str(&self.source)?;
        let context: BTreeMap<&str, &str> = values.iter().copied().collect();
        Ok(template.render(context)?)
    }
}

// ── Built-in templates ────────────────────────────────────────────────────────

/// Reads a full-text article and assesses ACMG evidence for one variant.
pub const PAPER_READER: &str = "\
You are a clinical geneticist applying the ACMG/AMP guidelines for inherited variants.

Read the research article below and report, for the variant {{ genetic_variant }} only:
1. Where the variant is mentioned and in which patients or families.
2. Each ACMG evidence criterion the article supports (for example PS3, PM2, PP1), quoting the passage.
3. Criteria the article argues against, if any.
4. A one-line summary of the evidence strength.

Answer in markdown. If the article does not mention the variant, say so and stop.

Article:
{{ pubmed_article }}
";

/// Summarises OMIM gene information as a gene-disease description.
pub const GENE_DESCRIPTION: &str = "\
As a genetics expert, summarise the gene-disease relationship described by the OMIM data below.
List each associated phenotype with its inheritance pattern, then describe the disease mechanism
and the kinds of pathogenic variants reported. Keep it factual and concise; answer in markdown.

Phenotype map:
{{ phenotype }}

Molecular genetics:
{{ molecular_genetics }}
";

/// ACMG classification from a variant-annotation record.
pub const ACMG_CLASSIFIER: &str = "\
You are analysing a genetic variant annotation to provide ACMG classification insights.

Variant: {{ genetic_variant }}

Annotation (JSON):
{{ annotation }}

For each ACMG criterion the annotation can inform (population frequency, predicted consequence,
in-silico scores, conservation, known clinical assertions), state whether it is met and why.
Finish with a proposed classification (Pathogenic, Likely pathogenic, VUS, Likely benign, Benign)
and the criteria combination behind it. Answer in markdown.
";

/// PVS1 decision-tree assessment for a putative loss-of-function variant.
pub const PVS1_EXPERT: &str = "\
Perform an ACMG PVS1 assessment following the PVS1 decision tree.

Variant annotation:
{{ variant_annotation }}

Gene annotation:
{{ gene_annotation }}

Transcript annotation:
{{ transcript_annotation }}

Walk the tree step by step: variant type, whether loss of function is a known disease mechanism
for the gene, predicted nonsense-mediated decay, exon and transcript relevance, and the share of the
protein affected. Conclude with PVS1, PVS1_Strong, PVS1_Moderate, PVS1_Supporting or Not applicable,
giving the decisive reason. Answer in markdown.
";
