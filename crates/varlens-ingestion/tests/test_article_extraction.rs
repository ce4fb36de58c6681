//! End-to-end article extraction against an in-process PMC stand-in.
//!
//! Run with: cargo test --package varlens-ingestion --test test_article_extraction

use std::net::SocketAddr;

use axum::extract::Path;
use axum::http::{header::USER_AGENT, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use pretty_assertions::assert_eq;
use varlens_common::{HttpSettings, SandboxClient, VarlensError};
use varlens_ingestion::article::{extract_html, ArticleExtractor};

const FIXTURE: &str = include_str!("fixtures/pmc_article.html");
const FIXTURE_ID: &str = "PMC5938503";

/// Serves the fixture for its own accession to browser-like clients only.
async fn article_page(Path(id): Path<String>, headers: HeaderMap) -> Response {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !user_agent.contains("Mozilla") {
        return StatusCode::FORBIDDEN.into_response();
    }
    if id != FIXTURE_ID {
        return StatusCode::NOT_FOUND.into_response();
    }
    Html(FIXTURE).into_response()
}

async fn spawn_pmc() -> SocketAddr {
    let app = Router::new().route("/articles/{id}/", get(article_page));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn article_url(addr: SocketAddr, id: &str) -> String {
    format!("http://{}/articles/{}/", addr, id)
}

#[tokio::test]
async fn test_extract_full_article() {
    let addr = spawn_pmc().await;
    let extractor = ArticleExtractor::new().unwrap();

    let article = extractor.extract(&article_url(addr, FIXTURE_ID)).await.unwrap();

    assert_eq!(article.pmcid, "PMC5938503");
    assert_eq!(article.pmid, "29743512");
    assert_eq!(
        article.title,
        "Loss-of-function variants in CYP27A1 cause cerebrotendinous xanthomatosis"
    );
    assert_eq!(
        article.abstract_text,
        "Cerebrotendinous xanthomatosis is a rare lipid storage disease.We describe two families."
    );
    assert_eq!(article.keywords, "CYP27A1, CTX, bile acids");

    assert_eq!(article.sections.len(), 2);
    assert_eq!(article.sections[0].title, "1. Introduction");
    assert_eq!(
        article.sections[0].content,
        "The CYP27A1 gene encodes sterol 27-hydroxylase.\nInheritance is autosomal recessive."
    );
    assert_eq!(article.sections[1].title, "2. Results");
    assert!(article.sections[1].content.starts_with("Both probands carried biallelic variants."));

    assert_eq!(article.tables.len(), 1);
    assert_eq!(article.tables[0].title, "Table 1");
    assert_eq!(article.tables[0].caption, "Variants identified");
    assert_eq!(
        article.tables[0].markdown,
        "| Variant   | Zygosity |\n| --------- | -------- |\n| c.1183C>T | Hom      |\n| c.379C>T  | Het      |"
    );

    assert_eq!(article.figures.len(), 1);
    assert_eq!(article.figures[0].id, "fig1");
    assert_eq!(article.figures[0].title, "Figure 1");
    assert_eq!(article.figures[0].caption, "Pedigrees of both families.");

    assert_eq!(article.acknowledgments, "We thank the families.");
    assert_eq!(
        article.references,
        vec![
            "Cali JJ, Russell DW. Mutations in the gene encoding sterol 27-hydroxylase. 1991.".to_string(),
            "Federico A, Dotti MT. Cerebrotendinous xanthomatosis. 2003.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_flattened_text_layout() {
    let addr = spawn_pmc().await;
    let extractor = ArticleExtractor::new().unwrap();

    let text = extractor
        .extract_plain_text(&article_url(addr, FIXTURE_ID))
        .await
        .unwrap();

    let expected = "\
Title:Loss-of-function variants in CYP27A1 cause cerebrotendinous xanthomatosis
PMCID: PMC5938503
PMID: 29743512
Abstract:Cerebrotendinous xanthomatosis is a rare lipid storage disease.We describe two families.
Keywords:CYP27A1, CTX, bile acids
Sections:
1. Introduction:The CYP27A1 gene encodes sterol 27-hydroxylase.
Inheritance is autosomal recessive.
2. Results:Both probands carried biallelic variants.
Variants identified
Pedigrees of both families.
Tables:
Title: Table 1Caption: Variants identifiedMarkdown Table:| Variant   | Zygosity |
| --------- | -------- |
| c.1183C>T | Hom      |
| c.379C>T  | Het      |
Figures:
Figure 1:Caption: Pedigrees of both families.
Acknowledgments:We thank the families.
References:Cali JJ, Russell DW. Mutations in the gene encoding sterol 27-hydroxylase. 1991.
Federico A, Dotti MT. Cerebrotendinous xanthomatosis. 2003.
";
    assert_eq!(text, expected);
}

#[tokio::test]
async fn test_unknown_article_is_status_error() {
    let addr = spawn_pmc().await;
    let extractor = ArticleExtractor::new().unwrap();
    let url = article_url(addr, "PMC1");

    let err = extractor.extract(&url).await.unwrap_err();

    match err {
        VarlensError::HttpStatus { status, url: failed } => {
            assert_eq!(status, 404);
            assert_eq!(failed, url);
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_browser_identity_is_refused() {
    let addr = spawn_pmc().await;
    let settings = HttpSettings {
        user_agent: "curl/8.5.0".to_string(),
        ..Default::default()
    };
    let extractor = ArticleExtractor::with_client(SandboxClient::with_settings(&settings).unwrap());

    let err = extractor.extract(&article_url(addr, FIXTURE_ID)).await.unwrap_err();
    assert!(matches!(err, VarlensError::HttpStatus { status: 403, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Reserve a port, then release it so nothing is listening
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let extractor = ArticleExtractor::new().unwrap();

    let err = extractor
        .extract(&format!("http://127.0.0.1:{}/articles/PMC5938503/", port))
        .await
        .unwrap_err();

    assert!(matches!(err, VarlensError::Http(_)));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_missing_identifier_fails_before_request() {
    let extractor = ArticleExtractor::new().unwrap();
    let err = extractor
        .extract("http://127.0.0.1:9/articles/no-accession/")
        .await
        .unwrap_err();
    assert!(matches!(err, VarlensError::InvalidIdentifier(_)));
}

#[test]
fn test_page_without_abstract_keeps_other_fields() {
    let html = FIXTURE.replace("class=\"abstract\"", "class=\"summary\"");
    let article = extract_html("https://pmc.ncbi.nlm.nih.gov/articles/PMC5938503/", &html).unwrap();

    assert_eq!(article.abstract_text, "");
    assert_eq!(article.pmid, "29743512");
    assert_eq!(article.sections.len(), 2);
    assert!(!article.to_plain_text().contains("Abstract:Cerebrotendinous"));
}
