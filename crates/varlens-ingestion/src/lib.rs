//! varlens-ingestion: Literature and annotation input for variant interpretation.
//!
//! Sources:
//!   - PMC full-text article pages (HTML, scraper)
//!   - Local variant-annotation service (JSON)
//!   - OMIM entry API (XML)
//!   - Gene / transcript reference tables (JSON files)
//!
//! Each article field is parsed independently: a missing region empties that
//! field and never fails the extraction.

pub mod article;
pub mod dom;
pub mod normalise;
pub mod reference;
pub mod sources;
pub mod tokens;

pub use article::{extract_html, flatten, identify, Article, ArticleExtractor};
pub use normalise::{GenomeBuild, GenomicPosition};
pub use reference::{ReferenceData, ReferenceMatch, ReferenceTable};
