//! Field extractors for PMC article pages.
//!
//! Each extractor returns `None` when its structural region is absent;
//! [`assemble`] turns that into the field's empty default so one missing
//! region never aborts the rest of the article.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::dom::{collapse_whitespace, paragraph_text, DomNode, Query, Region};
use super::model::{Article, ArticleFigure, ArticleSection, ArticleTable};
use super::table::to_markdown;

lazy_static! {
    static ref PUBMED_LINK: Regex = Regex::new(r"pubmed\.ncbi\.nlm\.nih\.gov/\d+").unwrap();
    static ref SECTION_ID: Regex = Regex::new(r"^sec\d+").unwrap();
}

const SECTION_TITLE_CLASS: &str = "pmc_sec_title";
const OBJECT_HEAD_CLASS: &str = "obj_head";
const KEYWORDS_LABEL: &str = "Keywords:";

/// Builds an [`Article`] from the document root.
pub fn assemble<'a, N: DomNode<'a>>(pmcid: String, root: N) -> Article {
    let article = Article {
        pmcid,
        pmid: or_empty("pmid", pmid(root)),
        title: or_empty("title", title(root)),
        abstract_text: or_empty("abstract", abstract_text(root)),
        keywords: or_empty("keywords", keywords(root)),
        sections: sections(root),
        tables: tables(root),
        figures: figures(root),
        references: or_empty("references", references(root)),
        acknowledgments: or_empty("acknowledgments", acknowledgments(root)),
    };

    debug!(
        pmcid = %article.pmcid,
        sections = article.sections.len(),
        tables = article.tables.len(),
        figures = article.figures.len(),
        references = article.references.len(),
        "article assembled"
    );
    article
}

fn or_empty<T: Default>(field: &str, value: Option<T>) -> T {
    value.unwrap_or_else(|| {
        debug!(field, "region not present, using empty default");
        T::default()
    })
}

/// First link into PubMed; its text is the PMID.
pub fn pmid<'a, N: DomNode<'a>>(root: N) -> Option<String> {
    root.find_first(&Query::tag("a").with_href_matching(&PUBMED_LINK))
        .map(|a| a.text())
}

pub fn title<'a, N: DomNode<'a>>(root: N) -> Option<String> {
    root.find_first(&Query::tag("hgroup")).map(|h| h.text())
}

pub fn abstract_text<'a, N: DomNode<'a>>(root: N) -> Option<String> {
    let section = root.find_first(&Query::tag("section").with_class("abstract"))?;
    let mut region = Region::new(section);
    // The "Abstract" heading must not leak into the content
    region.take_first(&Query::tag("h2"));
    Some(region.stripped_text())
}

pub fn keywords<'a, N: DomNode<'a>>(root: N) -> Option<String> {
    let group = root.find_first(&Query::tag("section").with_class("kwd-group"))?;
    Some(group.stripped_text().replace(KEYWORDS_LABEL, "").trim().to_string())
}

/// Body sections (`id="secN..."`) in document order; sections with neither
/// title nor content are dropped.
pub fn sections<'a, N: DomNode<'a>>(root: N) -> Vec<ArticleSection> {
    root.find_all(&Query::tag("section").with_id_matching(&SECTION_ID))
        .into_iter()
        .filter_map(section)
        .collect()
}

fn section<'a, N: DomNode<'a>>(node: N) -> Option<ArticleSection> {
    let mut region = Region::new(node);
    let title = region
        .take_first(&Query::headings(2, 5).with_class(SECTION_TITLE_CLASS))
        .map(|h| h.text())
        .unwrap_or_default();

    let content = region
        .find_all(&Query::tag("p"))
        .into_iter()
        .map(|p| paragraph_text(&p.text_segments(&[])))
        .collect::<Vec<_>>()
        .join("\n");

    let section = ArticleSection { title, content };
    (!section.is_empty()).then_some(section)
}

/// Table wrappers (`section.tw`) that contain a data table.
pub fn tables<'a, N: DomNode<'a>>(root: N) -> Vec<ArticleTable> {
    root.find_all(&Query::tag("section").with_class("tw"))
        .into_iter()
        .filter_map(table)
        .collect()
}

fn table<'a, N: DomNode<'a>>(wrapper: N) -> Option<ArticleTable> {
    let data = wrapper.find_first(&Query::tag("table").with_class("content"))?;

    let title = wrapper
        .find_first(&Query::tags(&["h3", "h4"]).with_class(OBJECT_HEAD_CLASS))
        .map(|h| h.stripped_text())
        .unwrap_or_default();
    let caption = wrapper
        .find_first(&Query::tag("div").with_class("caption"))
        .map(|c| c.stripped_text())
        .unwrap_or_default();

    let (header, rows) = table_cells(data);
    Some(ArticleTable { title, caption, markdown: to_markdown(&header, &rows) })
}

/// Header cells from the head row and cell text of every body row.
pub fn table_cells<'a, N: DomNode<'a>>(table: N) -> (Vec<String>, Vec<Vec<String>>) {
    let cell_query = Query::tags(&["th", "td"]);
    let row_cells = |row: N| -> Vec<String> {
        row.find_all(&cell_query).into_iter().map(|c| c.stripped_text()).collect()
    };

    let header = table
        .find_first(&Query::tag("thead"))
        .map(|head| row_cells(head.find_first(&Query::tag("tr")).unwrap_or(head)))
        .unwrap_or_default();

    let rows = table
        .find_first(&Query::tag("tbody"))
        .map(|body| body.find_all(&Query::tag("tr")).into_iter().map(row_cells).collect())
        .unwrap_or_default();

    (header, rows)
}

pub fn figures<'a, N: DomNode<'a>>(root: N) -> Vec<ArticleFigure> {
    root.find_all(&Query::tag("figure").with_class("fig"))
        .into_iter()
        .map(|fig| ArticleFigure {
            id: fig.attr("id").unwrap_or_default().to_string(),
            title: fig
                .find_first(&Query::headings(3, 5).with_class(OBJECT_HEAD_CLASS))
                .map(|h| h.text())
                .unwrap_or_default(),
            caption: fig
                .find_first(&Query::tag("figcaption"))
                .map(|c| c.stripped_text())
                .unwrap_or_default(),
        })
        .collect()
}

pub fn references<'a, N: DomNode<'a>>(root: N) -> Option<Vec<String>> {
    let list = root.find_first(&Query::tag("section").with_class("ref-list"))?;
    Some(
        list.find_all(&Query::tag("li"))
            .into_iter()
            .map(|li| collapse_whitespace(&li.stripped_text()))
            .collect(),
    )
}

pub fn acknowledgments<'a, N: DomNode<'a>>(root: N) -> Option<String> {
    let section = root.find_first(&Query::tag("section").with_class("ack"))?;
    let mut region = Region::new(section);
    region.take_first(&Query::tags(&["h2", "h3"]).with_class(SECTION_TITLE_CLASS));
    Some(region.stripped_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ScraperNode;
    use scraper::Html;

    fn article_from(html: &str) -> Article {
        let doc = Html::parse_document(html);
        assemble("PMC1".to_string(), ScraperNode::from(doc.root_element()))
    }

    #[test]
    fn test_missing_regions_yield_empty_defaults() {
        let article = article_from("<html><body><p>Nothing structured here.</p></body></html>");
        assert_eq!(article.pmcid, "PMC1");
        assert_eq!(article.pmid, "");
        assert_eq!(article.title, "");
        assert_eq!(article.abstract_text, "");
        assert_eq!(article.keywords, "");
        assert!(article.sections.is_empty());
        assert!(article.tables.is_empty());
        assert!(article.figures.is_empty());
        assert!(article.references.is_empty());
        assert_eq!(article.acknowledgments, "");
    }

    #[test]
    fn test_title_and_pmid() {
        let article = article_from(
            r#"<hgroup>
                 <h1>Loss of CYP27A1 function</h1>
               </hgroup>
               <a href="https://doi.org/10.1/x">doi</a>
               <a href="https://pubmed.ncbi.nlm.nih.gov/29735123/"> 29735123 </a>"#,
        );
        assert_eq!(article.title, "Loss of CYP27A1 function");
        assert_eq!(article.pmid, "29735123");
    }

    #[test]
    fn test_abstract_heading_removed() {
        let article = article_from(
            r#"<section class="abstract" id="abstract1"><h2>Abstract</h2>
               <p>Background text.</p> <p>Results text.</p></section>"#,
        );
        assert_eq!(article.abstract_text, "Background text.Results text.");
    }

    #[test]
    fn test_keywords_label_stripped() {
        let article = article_from(
            r#"<section class="kwd-group"><p><strong>Keywords:</strong> ACMG, variant, PVS1</p></section>"#,
        );
        assert_eq!(article.keywords, "ACMG, variant, PVS1");
    }

    #[test]
    fn test_section_heading_not_repeated_in_content() {
        let article = article_from(
            r#"<section id="sec3"><h2 class="pmc_sec_title">Results</h2><p>Data shown.</p></section>"#,
        );
        assert_eq!(
            article.sections,
            vec![ArticleSection { title: "Results".into(), content: "Data shown.".into() }]
        );
    }

    #[test]
    fn test_sections_ordered_and_empty_ones_dropped() {
        let article = article_from(
            r#"<section id="sec1"><h2 class="pmc_sec_title">Introduction</h2>
                 <p>First <em>para</em>graph.</p><p>Second.</p></section>
               <section id="sec2"></section>
               <section id="app1"><h2 class="pmc_sec_title">Appendix</h2></section>
               <section id="sec3"><p>Untitled content.</p></section>"#,
        );
        assert_eq!(article.sections.len(), 2);
        assert_eq!(article.sections[0].title, "Introduction");
        assert_eq!(article.sections[0].content, "First para graph.\nSecond.");
        assert_eq!(article.sections[1].title, "");
        assert_eq!(article.sections[1].content, "Untitled content.");
    }

    #[test]
    fn test_section_emphasis_with_nested_markup_kept_whole() {
        let article = article_from(
            r##"<section id="sec1"><h2 class="pmc_sec_title">Results</h2>
                 <p>carriers of<em>BRCA<sub>1</sub></em>were seen</p>
                 <p>see<em><a href="#t1">Table</a> 1</em>below</p></section>"##,
        );
        assert_eq!(
            article.sections[0].content,
            "carriers of BRCA1 were seen\nsee Table1 below"
        );
    }

    #[test]
    fn test_table_wrapper_converted() {
        let article = article_from(
            r#"<section class="tw" id="tab1">
                 <h3 class="obj_head">Table 1.</h3>
                 <div class="caption"><p>Variants found.</p></div>
                 <table class="content">
                   <thead><tr><th>Gene</th><th>Variant</th></tr></thead>
                   <tbody><tr><td>CYP27A1</td><td>c.410G&gt;A</td></tr></tbody>
                 </table>
               </section>
               <section class="tw"><h3 class="obj_head">Table 2.</h3></section>"#,
        );
        assert_eq!(article.tables.len(), 1);
        let t = &article.tables[0];
        assert_eq!(t.title, "Table 1.");
        assert_eq!(t.caption, "Variants found.");
        assert_eq!(
            t.markdown,
            "| Gene    | Variant  |\n| ------- | -------- |\n| CYP27A1 | c.410G>A |"
        );
    }

    #[test]
    fn test_figures_capture_id_title_caption() {
        let article = article_from(
            r#"<figure class="fig" id="F1"><h3 class="obj_head">Figure 1.</h3>
                 <figcaption><p>Pedigree of the family.</p></figcaption></figure>
               <figure class="fig"><img src="x.png"></figure>"#,
        );
        assert_eq!(article.figures.len(), 2);
        assert_eq!(
            article.figures[0],
            ArticleFigure { id: "F1".into(), title: "Figure 1.".into(), caption: "Pedigree of the family.".into() }
        );
        assert_eq!(article.figures[1], ArticleFigure::default());
    }

    #[test]
    fn test_reference_whitespace_collapsed() {
        let article = article_from(
            "<section class=\"ref-list\"><ul><li>Smith J,\n  2020.   Title.</li><li> Doe A. </li></ul></section>",
        );
        assert_eq!(article.references, vec!["Smith J, 2020. Title.", "Doe A."]);
    }

    #[test]
    fn test_acknowledgments_heading_removed() {
        let article = article_from(
            r#"<section class="ack"><h2 class="pmc_sec_title">Acknowledgments</h2><p>We thank the family.</p></section>"#,
        );
        assert_eq!(article.acknowledgments, "We thank the family.");
    }

    #[test]
    fn test_acknowledgments_without_heading() {
        let article = article_from(r#"<section class="ack"><p>Funded by X.</p></section>"#);
        assert_eq!(article.acknowledgments, "Funded by X.");
    }
}
