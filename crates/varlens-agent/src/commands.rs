//! Subcommand implementations. Results go to stdout; logs go to stderr.

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};
use varlens_common::SandboxClient;
use varlens_ingestion::article::ArticleExtractor;
use varlens_ingestion::reference::{ReferenceData, ReferenceMatch};
use varlens_ingestion::sources::{picked_consequence, phenotypes_to_markdown, AnnotationClient, OmimClient};
use varlens_ingestion::tokens::{estimate_completion, estimate_tokens, CompletionLength, ContentKind};
use varlens_ingestion::{GenomeBuild, GenomicPosition};
use varlens_llm::{build_backend, Interpreter, SamplingSettings};

use crate::config::Config;

fn http_client(config: &Config) -> anyhow::Result<SandboxClient> {
    SandboxClient::with_settings(&config.http_settings()).context("building HTTP client")
}

fn interpreter(config: &Config, client: SandboxClient, model: Option<&str>) -> anyhow::Result<Interpreter> {
    let alias = model.unwrap_or(&config.llm.default_alias);
    let backend = build_backend(alias, client)?;
    Ok(Interpreter::new(backend).with_sampling(SamplingSettings {
        temperature: config.llm.temperature,
        max_tokens: config.llm.max_tokens,
    }))
}

/// `varlens extract`
pub async fn extract(config: &Config, url: &str, json: bool) -> anyhow::Result<()> {
    let extractor = ArticleExtractor::with_client(http_client(config)?);
    let article = extractor.extract(url).await?;
    let text = article.to_plain_text();

    info!(
        pmcid = %article.pmcid,
        estimated_tokens = estimate_tokens(&text, ContentKind::English, true),
        "flattened article"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&article)?);
    } else {
        print!("{}", text);
    }
    Ok(())
}

/// `varlens read`: article → ACMG evidence for one variant.
pub async fn read(config: &Config, url: &str, variant: &str, model: Option<&str>) -> anyhow::Result<()> {
    let client = http_client(config)?;
    let interpreter = interpreter(config, client.clone(), model)?;

    let article = ArticleExtractor::with_client(client).extract(url).await?;
    let text = article.to_plain_text();

    let (prompt_tokens, _) = estimate_completion(&text, CompletionLength::Medium);
    if prompt_tokens > interpreter.max_context_tokens() {
        warn!(
            prompt_tokens,
            limit = interpreter.max_context_tokens(),
            model = interpreter.model_id(),
            "article likely exceeds the model context window"
        );
    }

    let answer = interpreter.interpret_article(&text, variant).await?;
    println!("{}", answer);
    Ok(())
}

/// `varlens gene`: OMIM entry → gene-disease description.
pub async fn gene(config: &Config, mim_number: &str, model: Option<&str>) -> anyhow::Result<()> {
    let client = http_client(config)?;
    let interpreter = interpreter(config, client.clone(), model)?;
    let omim = OmimClient::new(client, config.omim_api_key()).with_base_url(&config.omim.base_url);

    let molecular_genetics = omim
        .molecular_genetics(mim_number)
        .await
        .with_context(|| format!("fetching molecular genetics for MIM {}", mim_number))?;
    let phenotypes = omim
        .gene_map(mim_number)
        .await
        .with_context(|| format!("fetching gene map for MIM {}", mim_number))?;
    info!(mim_number, phenotypes = phenotypes.len(), "OMIM entry retrieved");

    let answer = interpreter
        .describe_gene(&phenotypes_to_markdown(&phenotypes), &molecular_genetics)
        .await?;
    println!("{}", answer);
    Ok(())
}

/// `varlens classify`: annotation → ACMG classification.
pub async fn classify(
    config: &Config,
    build: GenomeBuild,
    position: &GenomicPosition,
    model: Option<&str>,
) -> anyhow::Result<()> {
    let client = http_client(config)?;
    let interpreter = interpreter(config, client.clone(), model)?;

    let annotation = AnnotationClient::new(client)
        .with_url(&config.annotation.url)
        .annotate(build, position)
        .await
        .context("querying annotation service")?;

    let answer = interpreter.classify_variant(&annotation, &position.to_string()).await?;
    println!("{}", answer);
    Ok(())
}

/// `varlens pvs1`: annotation + reference tables → PVS1 justification.
pub async fn pvs1(
    config: &Config,
    build: GenomeBuild,
    position: &GenomicPosition,
    model: Option<&str>,
) -> anyhow::Result<()> {
    let client = http_client(config)?;
    let interpreter = interpreter(config, client.clone(), model)?;

    let reference = ReferenceData::load(&config.reference.gene_db, &config.reference.transcript_db)
        .context("loading gene/transcript reference tables")?;

    let annotation = AnnotationClient::new(client)
        .with_url(&config.annotation.url)
        .annotate(build, position)
        .await
        .context("querying annotation service")?;

    let matched = match picked_consequence(&annotation) {
        Some(consequence) => reference.lookup_for(consequence),
        None => {
            warn!(%position, "no picked transcript consequence; reference annotations left empty");
            ReferenceMatch::default()
        }
    };

    let answer = interpreter
        .justify_pvs1(&annotation, &matched.gene, &matched.transcript)
        .await?;
    println!("{}", answer);
    Ok(())
}

/// `varlens tokens`
pub fn tokens(file: &Path, kind: ContentKind, length: CompletionLength) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;

    let (prompt_tokens, completion_tokens) = match kind {
        ContentKind::English => estimate_completion(&text, length),
        _ => {
            let prompt_tokens = estimate_tokens(&text, kind, true);
            (prompt_tokens, (prompt_tokens as f64 * length.multiplier()).floor() as usize)
        }
    };

    println!("prompt_tokens: {}", prompt_tokens);
    println!("completion_tokens: {}", completion_tokens);
    println!("total_tokens: {}", prompt_tokens + completion_tokens);
    Ok(())
}
