//! Plain text extraction and normalization.
//!
//! Entities are decoded once, by the tokenizer, when text nodes are created.
//! The string functions here only collapse whitespace and optionally strip
//! punctuation, which keeps them idempotent.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parse::{Document, Element};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

/// How much of the text survives normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    /// Whitespace collapsed, punctuation kept.
    #[default]
    Standard,
    /// Whitespace collapsed and every non-word, non-space character removed.
    Strict,
}

/// Collapse every whitespace run into one space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Remove punctuation, then collapse whitespace.
pub fn strip_punctuation(text: &str) -> String {
    normalize_whitespace(&PUNCTUATION.replace_all(text, " "))
}

/// Normalize an arbitrary string under the given mode.
pub fn normalize(text: &str, mode: TextMode) -> String {
    match mode {
        TextMode::Standard => normalize_whitespace(text),
        TextMode::Strict => strip_punctuation(text),
    }
}

/// Normalized text of an element: descendant text nodes joined with a space.
pub fn element_text(element: &Element<'_>, mode: TextMode) -> String {
    let joined = element.text_nodes().collect::<Vec<_>>().join(" ");
    normalize(&joined, mode)
}

/// Normalized text of an element, leaving out the subtree of `skip`.
pub fn element_text_without<'a>(element: &Element<'a>, skip: Option<&Element<'a>>, mode: TextMode) -> String {
    let Some(skip) = skip else {
        return element_text(element, mode);
    };

    let skip_ref = skip.element_ref();
    let joined = element
        .element_ref()
        .descendants()
        .filter(|node| !node.ancestors().any(|ancestor| ancestor.id() == skip_ref.id()))
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect::<Vec<&str>>()
        .join(" ");

    normalize(&joined, mode)
}

/// Line-oriented clean text of a whole document.
///
/// Every line of the concatenated text is trimmed and split into phrases on
/// double spaces; non-empty phrases are joined with newlines.
pub fn document_clean_text(doc: &Document) -> String {
    let text = match doc.select_first("body") {
        Ok(Some(body)) => body.text(),
        _ => doc.text_content(),
    };

    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of whitespace separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  hello   world  ", "hello world")]
    #[case("line\none\ttab", "line one tab")]
    #[case("\u{a0}non\u{a0}breaking\u{a0}", "non breaking")]
    #[case("", "")]
    #[case("   \n\t ", "")]
    fn test_normalize_whitespace(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_whitespace(input), expected);
    }

    #[rstest]
    #[case("Hello, world!", "Hello world")]
    #[case("rock-n-roll (live)", "rock n roll live")]
    #[case("café's menu", "café s menu")]
    #[case("snake_case stays", "snake_case stays")]
    fn test_strip_punctuation(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_punctuation(input), expected);
    }

    #[rstest]
    #[case("  a  b\n\nc ")]
    #[case("Already normal text.")]
    #[case("&amp; stays &amp;")]
    #[case("mixed -- punctuation!!  and\tspace")]
    fn test_normalization_is_idempotent(#[case] input: &str) {
        for mode in [TextMode::Standard, TextMode::Strict] {
            let once = normalize(input, mode);
            assert_eq!(normalize(&once, mode), once);
        }
    }

    #[test]
    fn test_element_text_joins_nodes_with_space() {
        let doc = Document::parse("<div><p>one</p><p>two</p><span>three</span></div>").unwrap();
        let div = doc.select_first("div").unwrap().unwrap();
        assert_eq!(element_text(&div, TextMode::Standard), "one two three");
    }

    #[test]
    fn test_element_text_decodes_entities() {
        let doc = Document::parse("<div>Fish &amp; Chips&nbsp;&lt;today&gt;</div>").unwrap();
        let div = doc.select_first("div").unwrap().unwrap();
        assert_eq!(element_text(&div, TextMode::Standard), "Fish & Chips <today>");
        assert_eq!(element_text(&div, TextMode::Strict), "Fish Chips today");
    }

    #[test]
    fn test_element_text_without_heading() {
        let doc = Document::parse("<article><h1>Rain</h1><p>rain <b>rain</b> rain</p></article>").unwrap();
        let article = doc.select_first("article").unwrap().unwrap();
        let heading = doc.select_first("h1").unwrap().unwrap();

        assert_eq!(element_text_without(&article, Some(&heading), TextMode::Standard), "rain rain rain");
        assert_eq!(element_text_without(&article, None, TextMode::Standard), "Rain rain rain rain");
    }

    #[test]
    fn test_malformed_markup_text() {
        let doc = Document::parse("<div><p>text</div>").unwrap();
        let div = doc.select_first("div").unwrap().unwrap();
        assert_eq!(element_text(&div, TextMode::Standard), "text");
    }

    #[test]
    fn test_document_clean_text() {
        let html = "<html><head><title>T</title><style>p{}</style></head><body>\n  <h1>Title</h1>\n  <p>First  second</p>\n\n<script>x()</script><p>Third</p></body></html>";
        let doc = Document::parse(html).unwrap();
        assert_eq!(document_clean_text(&doc), "Title\nFirst\nsecond\nThird");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("hello world"), 2);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count(" a  b c "), 3);
    }
}
