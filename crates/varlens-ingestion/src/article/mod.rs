//! PMC full-text article extraction.
//!
//! `identify` → `ArticleExtractor::extract` → `Article::to_plain_text` is the
//! path the paper-reader workflow takes: find the accession in the URL,
//! fetch the page once, parse each field independently, flatten for the LLM.

pub mod extractor;
pub mod fields;
pub mod flatten;
pub mod model;
pub mod table;

pub use extractor::{extract_html, identify, parse_article, ArticleExtractor};
pub use flatten::flatten;
pub use model::{Article, ArticleFigure, ArticleSection, ArticleTable};
