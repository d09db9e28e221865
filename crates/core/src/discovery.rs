//! Candidate block discovery.
//!
//! A discovery pass collects the elements of one tag type in document order.
//! Policies decide which passes run and in which order.

use serde::{Deserialize, Serialize};

use crate::keywords::KeywordCount;
use crate::parse::{Document, Element};
use crate::Result;

/// Default cap on elements examined per pass.
pub const DEFAULT_MAX_BLOCKS_PER_PASS: usize = 50;

const SEMANTIC_PASSES: &[&str] = &["article"];
const CASCADE_PASSES: &[&str] = &["article", "section", "div"];

/// Which tag types are considered content blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryPolicy {
    /// Only `<article>` elements.
    SemanticFirst,
    /// `<article>`, then `<section>`, then `<div>`.
    #[default]
    FallbackCascade,
}

impl DiscoveryPolicy {
    /// Tag names of the passes, in priority order.
    pub fn passes(&self) -> &'static [&'static str] {
        match self {
            Self::SemanticFirst => SEMANTIC_PASSES,
            Self::FallbackCascade => CASCADE_PASSES,
        }
    }
}

/// A content candidate and everything derived from it.
#[derive(Debug, Clone)]
pub struct Block<'a> {
    /// The candidate element
    pub element: Element<'a>,
    /// Tag of the pass that produced this block
    pub pass: &'static str,
    /// Document-order position within the pass
    pub position: usize,
    /// Text nodes concatenated as-is
    pub raw_text: String,
    /// Normalized text keywords are counted in
    pub text: String,
    /// Keywords meeting the threshold
    pub matched: Vec<KeywordCount>,
    /// The element the heading was read from
    pub heading_element: Option<Element<'a>>,
    pub heading: Option<String>,
    pub url: Option<String>,
    /// ISO-8601 `YYYY-MM-DD`
    pub date: Option<String>,
}

impl<'a> Block<'a> {
    fn new(element: Element<'a>, pass: &'static str, position: usize, raw_text: String) -> Self {
        Self {
            element,
            pass,
            position,
            raw_text,
            text: String::new(),
            matched: Vec::new(),
            heading_element: None,
            heading: None,
            url: None,
            date: None,
        }
    }

    /// Sum of the qualifying keyword counts.
    pub fn total_count(&self) -> usize {
        crate::keywords::total_count(&self.matched)
    }

    /// Whether either block lies inside the other.
    pub fn overlaps(&self, other: &Block<'a>) -> bool {
        self.element.contains(&other.element) || other.element.contains(&self.element)
    }
}

/// Run one pass: the first `limit` elements named `tag`, minus the ones
/// without any text and the ones nested inside a block already taken.
///
/// Empty and nested elements still count toward `limit`.
pub fn discover_pass<'a>(doc: &'a Document, tag: &'static str, limit: usize) -> Result<Vec<Block<'a>>> {
    let mut blocks: Vec<Block<'a>> = Vec::new();

    for (position, element) in doc.select(tag)?.into_iter().take(limit).enumerate() {
        if blocks.iter().any(|outer| outer.element.contains(&element)) {
            continue;
        }
        let raw_text = element.text();
        if !raw_text.trim().is_empty() {
            blocks.push(Block::new(element, tag, position, raw_text));
        }
    }

    tracing::debug!(pass = tag, candidates = blocks.len(), "discovery pass");
    Ok(blocks)
}

/// Run every pass of a policy.
pub fn discover<'a>(doc: &'a Document, policy: DiscoveryPolicy, limit: usize) -> Result<Vec<Vec<Block<'a>>>> {
    policy.passes().iter().map(|&tag| discover_pass(doc, tag, limit)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_passes() {
        assert_eq!(DiscoveryPolicy::SemanticFirst.passes(), &["article"]);
        assert_eq!(DiscoveryPolicy::FallbackCascade.passes(), &["article", "section", "div"]);
    }

    #[test]
    fn test_document_order_and_positions() {
        let doc = Document::parse("<article>one</article><div><article>two</article></div><article>three</article>")
            .unwrap();
        let blocks = discover_pass(&doc, "article", DEFAULT_MAX_BLOCKS_PER_PASS).unwrap();

        let texts: Vec<_> = blocks.iter().map(|b| b.raw_text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_eq!(blocks.iter().map(|b| b.position).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(blocks.iter().all(|b| b.pass == "article"));
    }

    #[test]
    fn test_empty_blocks_skipped() {
        let doc = Document::parse("<section> </section><section><p>\n</p></section><section>text</section>").unwrap();
        let blocks = discover_pass(&doc, "section", DEFAULT_MAX_BLOCKS_PER_PASS).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].position, 2);
    }

    #[test]
    fn test_noise_only_block_is_empty() {
        let doc = Document::parse("<article><script>var a = 1;</script><svg><text>x</text></svg></article>").unwrap();
        assert!(discover_pass(&doc, "article", DEFAULT_MAX_BLOCKS_PER_PASS).unwrap().is_empty());
    }

    #[test]
    fn test_limit_counts_examined_elements() {
        let mut html = String::from("<div></div>");
        for i in 0..60 {
            html.push_str(&format!("<div>block {}</div>", i));
        }
        let doc = Document::parse(&html).unwrap();

        let blocks = discover_pass(&doc, "div", DEFAULT_MAX_BLOCKS_PER_PASS).unwrap();
        assert_eq!(blocks.len(), 49);
        assert_eq!(blocks.last().unwrap().raw_text, "block 48");
    }

    #[test]
    fn test_discover_runs_all_passes() {
        let doc = Document::parse("<article>a</article><section>b</section><div>c</div>").unwrap();
        let passes = discover(&doc, DiscoveryPolicy::FallbackCascade, 10).unwrap();
        assert_eq!(passes.len(), 3);
        assert!(passes.iter().all(|p| p.len() == 1));

        let semantic = discover(&doc, DiscoveryPolicy::SemanticFirst, 10).unwrap();
        assert_eq!(semantic.len(), 1);
    }

    #[test]
    fn test_nested_same_tag_taken_once() {
        let doc = Document::parse("<div><div><div>storm storm</div></div></div><div>calm</div>").unwrap();
        let blocks = discover_pass(&doc, "div", DEFAULT_MAX_BLOCKS_PER_PASS).unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].position, 0);
        assert_eq!(blocks[1].position, 3);
        assert_eq!(blocks[1].raw_text, "calm");
    }

    #[test]
    fn test_nested_articles_report_outer() {
        let doc = Document::parse("<article><h2>Outer</h2><article>inner</article></article>").unwrap();
        let blocks = discover_pass(&doc, "article", DEFAULT_MAX_BLOCKS_PER_PASS).unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].raw_text, "Outerinner");
    }

    #[test]
    fn test_overlap() {
        let doc = Document::parse("<section><div>inner</div></section><div>other</div>").unwrap();
        let sections = discover_pass(&doc, "section", 10).unwrap();
        let divs = discover_pass(&doc, "div", 10).unwrap();

        assert!(sections[0].overlaps(&divs[0]));
        assert!(divs[0].overlaps(&sections[0]));
        assert!(!sections[0].overlaps(&divs[1]));
    }
}
