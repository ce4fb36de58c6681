//! Normalised article record.

use serde::{Deserialize, Serialize};

/// A full-text article as extracted from its PMC page.
///
/// Every sequence is in document order. Structural elements missing from
/// the page show up as empty strings or empty vectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// PMC accession recovered from the source URL, e.g. "PMC5938503".
    pub pmcid: String,
    /// PubMed ID cross-reference, empty if the page does not link one.
    pub pmid: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// As authored (comma or semicolon separated), label stripped.
    pub keywords: String,
    pub sections: Vec<ArticleSection>,
    pub tables: Vec<ArticleTable>,
    pub figures: Vec<ArticleFigure>,
    pub references: Vec<String>,
    pub acknowledgments: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSection {
    pub title: String,
    /// Paragraphs joined with '\n'.
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleTable {
    pub title: String,
    pub caption: String,
    /// Fixed-width, pipe-delimited rendering of the data table.
    pub markdown: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleFigure {
    pub id: String,
    pub title: String,
    pub caption: String,
}

impl ArticleSection {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_json_uses_abstract_key() {
        let article = Article {
            pmcid: "PMC1".into(),
            abstract_text: "Short.".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["abstract"], "Short.");
        assert_eq!(json["sections"], serde_json::json!([]));
        let back: Article = serde_json::from_value(json).unwrap();
        assert_eq!(back, article);
    }
}
