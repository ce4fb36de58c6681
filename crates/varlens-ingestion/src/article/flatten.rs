//! Plain-text serialisation of an [`Article`] for prompt templates.
//!
//! Block order and labels are stable; prompts downstream rely on them.

use super::model::Article;

/// Flattens `article` into a single text block.
///
/// Order: title, identifiers, abstract, keywords, sections, tables, figures,
/// acknowledgments, references. Tables, figures, acknowledgments and
/// references are left out entirely when empty.
pub fn flatten(article: &Article) -> String {
    let mut out = format!(
        "Title:{}\nPMCID: {}\nPMID: {}\nAbstract:{}\nKeywords:{}\n",
        article.title, article.pmcid, article.pmid, article.abstract_text, article.keywords
    );

    out.push_str("Sections:");
    for section in &article.sections {
        out.push_str(&format!("\n{}:{}", section.title, section.content));
    }

    if !article.tables.is_empty() {
        out.push_str("\nTables:");
        for table in &article.tables {
            out.push_str(&format!(
                "\nTitle: {}Caption: {}Markdown Table:{}",
                table.title, table.caption, table.markdown
            ));
        }
    }

    if !article.figures.is_empty() {
        out.push_str("\nFigures:");
        for figure in &article.figures {
            out.push_str(&format!("\n{}:Caption: {}", figure.title, figure.caption));
        }
    }

    if !article.acknowledgments.is_empty() {
        out.push_str("\nAcknowledgments:");
        out.push_str(&article.acknowledgments);
    }

    if !article.references.is_empty() {
        out.push_str("\nReferences:");
        for reference in &article.references {
            out.push_str(reference);
            out.push('\n');
        }
    }

    out
}

impl Article {
    /// See [`flatten`].
    pub fn to_plain_text(&self) -> String {
        flatten(self)
    }
}
