//! Narrow DOM-query interface used by the article extractor.
//!
//! Field extractors only see [`DomNode`], [`Query`] and [`Region`]; the
//! HTML backend ([`ScraperNode`], built on `scraper`) can be swapped without
//! touching extraction rules.
//!
//! Text comes out of a node as a list of [`TextSegment`]s (raw text nodes in
//! document order). The helpers at the bottom of this module turn those into
//! the normalised strings the extractor needs.

use regex::Regex;
use scraper::ElementRef;

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// One raw text node found under an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment<'a> {
    pub text: &'a str,
    /// Ordinal of the outermost enclosing `<em>`, numbered in document
    /// order. Segments sharing it belong to one emphasised run.
    pub emphasis: Option<usize>,
}

/// Element predicate: tag set, class, and attribute patterns. Every
/// constraint that is set must hold.
#[derive(Debug, Clone, Default)]
pub struct Query<'q> {
    tags: Vec<&'q str>,
    class: Option<&'q str>,
    id: Option<&'q Regex>,
    href: Option<&'q Regex>,
}

impl<'q> Query<'q> {
    pub fn tag(tag: &'q str) -> Self {
        Self { tags: vec![tag], ..Default::default() }
    }

    pub fn tags(tags: &[&'q str]) -> Self {
        Self { tags: tags.to_vec(), ..Default::default() }
    }

    /// Any heading from `h<from>` to `h<to>` inclusive.
    pub fn headings(from: usize, to: usize) -> Self {
        let from = from.clamp(1, 6);
        let to = to.clamp(from, 6);
        Self { tags: HEADINGS[from - 1..to].to_vec(), ..Default::default() }
    }

    pub fn with_class(mut self, class: &'q str) -> Self {
        self.class = Some(class);
        self
    }

    pub fn with_id_matching(mut self, pattern: &'q Regex) -> Self {
        self.id = Some(pattern);
        self
    }

    pub fn with_href_matching(mut self, pattern: &'q Regex) -> Self {
        self.href = Some(pattern);
        self
    }

    pub fn matches<'a, N: DomNode<'a>>(&self, node: N) -> bool {
        if !self.tags.is_empty() && !self.tags.iter().any(|t| node.tag_name().eq_ignore_ascii_case(t)) {
            return false;
        }
        if let Some(class) = self.class {
            if !node.has_class(class) {
                return false;
            }
        }
        let attr_matches = |name: &str, pattern: Option<&Regex>| match pattern {
            None => true,
            Some(re) => node.attr(name).is_some_and(|v| re.is_match(v)),
        };
        attr_matches("id", self.id) && attr_matches("href", self.href)
    }
}

/// Read-only view of an element in a parsed document.
pub trait DomNode<'a>: Copy + PartialEq + Sized + 'a {
    fn tag_name(self) -> &'a str;

    fn attr(self, name: &str) -> Option<&'a str>;

    fn has_class(self, class: &str) -> bool;

    /// Descendant elements in document order, not including `self`.
    fn descendant_elements(self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// True if `self` is `ancestor` or lies inside it.
    fn is_within(self, ancestor: Self) -> bool;

    /// Text nodes under `self`, skipping the subtrees rooted at `pruned`.
    fn text_segments(self, pruned: &[Self]) -> Vec<TextSegment<'a>>;

    fn find_first(self, query: &Query<'_>) -> Option<Self> {
        self.descendant_elements().find(|n| query.matches(*n))
    }

    fn find_all(self, query: &Query<'_>) -> Vec<Self> {
        self.descendant_elements().filter(|n| query.matches(*n)).collect()
    }

    /// Full text content, trimmed at the ends only.
    fn text(self) -> String {
        raw_text(&self.text_segments(&[]))
    }

    /// Every text node trimmed, empties dropped, the rest concatenated.
    fn stripped_text(self) -> String {
        stripped_text(&self.text_segments(&[]))
    }
}

/// An element with some of its descendants logically removed.
///
/// The backing document is never mutated, so one parsed tree can serve
/// every field extractor.
#[derive(Debug, Clone)]
pub struct Region<N> {
    node: N,
    removed: Vec<N>,
}

impl<'a, N: DomNode<'a>> Region<N> {
    pub fn new(node: N) -> Self {
        Self { node, removed: Vec::new() }
    }

    pub fn node(&self) -> N {
        self.node
    }

    /// Drops `child` (and everything under it) from this view.
    pub fn remove(&mut self, child: N) {
        self.removed.push(child);
    }

    /// Finds the first match, removes it, and returns it.
    pub fn take_first(&mut self, query: &Query<'_>) -> Option<N> {
        let found = self.find_first(query)?;
        self.remove(found);
        Some(found)
    }

    fn is_removed(&self, node: N) -> bool {
        self.removed.iter().any(|r| node.is_within(*r))
    }

    pub fn find_first(&self, query: &Query<'_>) -> Option<N> {
        self.node
            .descendant_elements()
            .find(|n| !self.is_removed(*n) && query.matches(*n))
    }

    pub fn find_all(&self, query: &Query<'_>) -> Vec<N> {
        self.node
            .descendant_elements()
            .filter(|n| !self.is_removed(*n) && query.matches(*n))
            .collect()
    }

    pub fn segments(&self) -> Vec<TextSegment<'a>> {
        self.node.text_segments(&self.removed)
    }

    pub fn stripped_text(&self) -> String {
        stripped_text(&self.segments())
    }
}

// ── scraper backend ───────────────────────────────────────────────────────────

/// [`DomNode`] over a `scraper` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScraperNode<'a>(ElementRef<'a>);

impl<'a> From<ElementRef<'a>> for ScraperNode<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        Self(element)
    }
}

impl<'a> DomNode<'a> for ScraperNode<'a> {
    fn tag_name(self) -> &'a str {
        let element: &'a scraper::node::Element = self.0.value();
        element.name()
    }

    fn attr(self, name: &str) -> Option<&'a str> {
        let element: &'a scraper::node::Element = self.0.value();
        element.attr(name)
    }

    fn has_class(self, class: &str) -> bool {
        self.0.value().classes().any(|c| c == class)
    }

    fn descendant_elements(self) -> Box<dyn Iterator<Item = Self> + 'a> {
        let root = *self.0;
        Box::new(
            root.descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .map(ScraperNode),
        )
    }

    fn is_within(self, ancestor: Self) -> bool {
        if self == ancestor {
            return true;
        }
        let target = *ancestor.0;
        self.0.ancestors().any(|a| a == target)
    }

    fn text_segments(self, pruned: &[Self]) -> Vec<TextSegment<'a>> {
        let root = *self.0;
        let mut segments = Vec::new();
        let mut last_em = None;
        let mut em_runs = 0;

        for node in root.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };

            let mut outermost_em = None;
            let mut skipped = false;
            for ancestor in node.ancestors() {
                if ancestor == root {
                    break;
                }
                let Some(element) = ElementRef::wrap(ancestor) else {
                    continue;
                };
                if pruned.iter().any(|p| p.0 == element) {
                    skipped = true;
                    break;
                }
                if element.value().name() == "em" {
                    outermost_em = Some(element);
                }
            }

            if !skipped {
                let emphasis = outermost_em.map(|em| {
                    if last_em != Some(em) {
                        last_em = Some(em);
                        em_runs += 1;
                    }
                    em_runs
                });
                let text: &'a str = text;
                segments.push(TextSegment { text, emphasis });
            }
        }

        segments
    }
}

// ── Text normalisation ────────────────────────────────────────────────────────

/// Concatenation of every segment, trimmed at both ends.
pub fn raw_text(segments: &[TextSegment<'_>]) -> String {
    let joined: String = segments.iter().map(|s| s.text).collect();
    joined.trim().to_string()
}

/// Each segment trimmed, empty ones dropped, the rest concatenated with no separator.
pub fn stripped_text(segments: &[TextSegment<'_>]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Paragraph text where each `<em>` is flattened to its stripped text and
/// padded with one space on each side, so words on either side of the
/// emphasis boundary never merge.
pub fn paragraph_text(segments: &[TextSegment<'_>]) -> String {
    let mut out = String::new();
    let mut rest = segments;
    while let Some((first, tail)) = rest.split_first() {
        match first.emphasis {
            Some(run) => {
                let len = rest.iter().take_while(|s| s.emphasis == Some(run)).count();
                out.push(' ');
                out.push_str(&stripped_text(&rest[..len]));
                out.push(' ');
                rest = &rest[len..];
            }
            None => {
                out.push_str(first.text.trim());
                rest = tail;
            }
        }
    }
    collapse_whitespace(&out)
}

/// Collapses every whitespace run to a single space and trims.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
