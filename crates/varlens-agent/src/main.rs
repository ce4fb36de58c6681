//! Varlens: literature-assisted genetic variant interpretation.
//! Entry point for the `varlens` binary.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use varlens_ingestion::tokens::{CompletionLength, ContentKind};
use varlens_ingestion::{GenomeBuild, GenomicPosition};

#[derive(Parser)]
#[command(name = "varlens")]
#[command(about = "Literature-assisted genetic variant interpretation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a PMC article page as flattened text
    Extract {
        /// Article URL containing a PMC accession
        url: String,

        /// Print the structured article as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Read an article and assess ACMG evidence for a variant
    Read {
        url: String,

        /// Variant label as written in the article (e.g. "CYP27A1 c.1183C>T")
        #[arg(long)]
        variant: String,

        /// LLM alias: claude, chatgpt, doubao or kimi
        #[arg(long)]
        model: Option<String>,
    },

    /// Describe a gene's disease associations from its OMIM entry
    Gene {
        /// OMIM gene MIM number
        mim: String,

        #[arg(long)]
        model: Option<String>,
    },

    /// ACMG classification from the variant-annotation service
    Classify {
        /// Reference build: hg19 or hg38
        #[arg(long)]
        genome: GenomeBuild,

        /// chr-position-ref-alt, e.g. chr2-31754395-C-T
        #[arg(long)]
        position: GenomicPosition,

        #[arg(long)]
        model: Option<String>,
    },

    /// PVS1 assessment from variant, gene and transcript annotations
    Pvs1 {
        #[arg(long)]
        genome: GenomeBuild,

        #[arg(long)]
        position: GenomicPosition,

        #[arg(long)]
        model: Option<String>,
    },

    /// Estimate prompt and completion tokens for a text file
    Tokens {
        file: PathBuf,

        /// english, chinese, code or json
        #[arg(long, default_value = "english")]
        kind: ContentKind,

        /// short, medium or long
        #[arg(long, default_value = "medium")]
        completion: CompletionLength,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // API keys may live in .env
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded environment file");
    }
    let config = config::Config::load()?;

    match cli.command {
        Commands::Extract { url, json } => commands::extract(&config, &url, json).await,
        Commands::Read { url, variant, model } => {
            commands::read(&config, &url, &variant, model.as_deref()).await
        }
        Commands::Gene { mim, model } => commands::gene(&config, &mim, model.as_deref()).await,
        Commands::Classify { genome, position, model } => {
            commands::classify(&config, genome, &position, model.as_deref()).await
        }
        Commands::Pvs1 { genome, position, model } => {
            commands::pvs1(&config, genome, &position, model.as_deref()).await
        }
        Commands::Tokens { file, kind, completion } => commands::tokens(&file, kind, completion),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Structured logging to stderr; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("varlens=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_classify_arguments() {
        let cli = Cli::try_parse_from([
            "varlens", "classify", "--genome", "hg38", "--position", "chr2-31754395-C-T", "--model", "kimi",
        ])
        .unwrap();
        match cli.command {
            Commands::Classify { genome, position, model } => {
                assert_eq!(genome, GenomeBuild::Hg38);
                assert_eq!(position.position, 31_754_395);
                assert_eq!(model.as_deref(), Some("kimi"));
            }
            _ => panic!("expected classify"),
        }
    }

    #[test]
    fn test_invalid_position_rejected_by_parser() {
        let parsed = Cli::try_parse_from([
            "varlens", "pvs1", "--genome", "hg19", "--position", "BRCA1 c.68_69del",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_tokens_defaults() {
        let cli = Cli::try_parse_from(["varlens", "tokens", "article.txt"]).unwrap();
        match cli.command {
            Commands::Tokens { kind, completion, .. } => {
                assert_eq!(kind, ContentKind::English);
                assert_eq!(completion, CompletionLength::Medium);
            }
            _ => panic!("expected tokens"),
        }
    }

    #[test]
    fn test_tokens_rejects_unknown_kind_and_length() {
        let cli = Cli::try_parse_from(["varlens", "tokens", "a.txt", "--kind", "json", "--completion", "long"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Tokens { kind: ContentKind::Json, completion: CompletionLength::Long, .. }
        ));
        assert!(Cli::try_parse_from(["varlens", "tokens", "a.txt", "--kind", "jsno"]).is_err());
        assert!(Cli::try_parse_from(["varlens", "tokens", "a.txt", "--completion", "huge"]).is_err());
    }
}
