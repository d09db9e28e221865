//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types. A document is
//! parsed once per request, stripped of noise elements, and then only read.
//! The tree is an arena owned by the document; an [`Element`] is a borrowed
//! handle into it that can walk down to descendants and up to ancestors.
//!
//! # Example
//!
//! ```rust
//! use glean_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <script>track()</script>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! assert!(!doc.text_content().contains("track"));
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::preprocess::{self, PreprocessConfig};
use crate::{GleanError, Result};

/// Represents a parsed, noise-free HTML document.
///
/// # Example
///
/// ```rust
/// use glean_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML with the default noise removal.
    ///
    /// Parsing is lenient: unclosed and misnested tags are repaired the way a
    /// browser would repair them, so this never fails on string input.
    pub fn parse(html: &str) -> Result<Self> {
        Self::parse_with_config(html, &PreprocessConfig::default())
    }

    /// Parses HTML with explicit preprocessing options.
    ///
    /// Noise elements are removed twice: from the source text before parsing
    /// and from the tree after parsing. The second sweep catches elements that
    /// only exist after the parser has repaired the markup.
    pub fn parse_with_config(html: &str, config: &PreprocessConfig) -> Result<Self> {
        let cleaned = preprocess::preprocess_html(html, config);
        let mut html = Html::parse_document(&cleaned);
        detach_elements(&mut html, &config.removed_tags());

        Ok(Self { html })
    }

    /// Parses raw bytes, which must be UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::Parse`] for non-text input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let html = std::str::from_utf8(bytes)
            .map_err(|e| GleanError::Parse(format!("document is not valid UTF-8 text: {}", e)))?;
        Self::parse(html)
    }

    /// Gets the underlying `scraper::Html`.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The `<html>` element.
    pub fn root(&self) -> Element<'_> {
        Element { element: self.html.root_element() }
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::Internal`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use glean_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|element| Element { element }).collect())
    }

    /// First element matching a selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(|element| Element { element }))
    }

    /// Gets the title of the document.
    pub fn title(&self) -> Option<String> {
        let title = self.select_first("title").ok()??;
        let text = title.text();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// The `href` of the first `<base>` element.
    pub fn base_href(&self) -> Option<String> {
        self.attr_of_first("base[href]", "href")
    }

    /// The `href` of `<link rel="canonical">`.
    pub fn canonical_url(&self) -> Option<String> {
        self.attr_of_first("link[rel=\"canonical\"][href]", "href")
    }

    /// Get meta tag content by `property` or `name` attribute
    pub fn meta_content(&self, key: &str) -> Option<String> {
        self.attr_of_first(&format!("meta[property=\"{}\"][content]", key), "content")
            .or_else(|| self.attr_of_first(&format!("meta[name=\"{}\"][content]", key), "content"))
    }

    /// Gets all text content from the document, concatenated as-is.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }

    fn attr_of_first(&self, selector: &str, attr: &str) -> Option<String> {
        let element = self.select_first(selector).ok()??;
        let value = element.attr(attr)?.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// A wrapper around scraper's ElementRef.
///
/// Element is a non-owning handle to a node in the document's arena. It can
/// read attributes and text, select descendants, and walk up to ancestors.
///
/// # Example
///
/// ```rust
/// use glean_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the underlying `scraper::ElementRef`.
    pub fn element_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the text content of this element, concatenated as-is.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Iterates over descendant text nodes in document order.
    pub fn text_nodes(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.element.text()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> &'a str {
        self.element.value().name()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::Internal`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|element| Element { element }).collect())
    }

    /// First descendant matching a selector.
    pub fn select_first(&self, selector: &str) -> Result<Option<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).next().map(|element| Element { element }))
    }

    /// The parent element, if any.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(|element| Element { element })
    }

    /// Ancestor elements, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        self.element.ancestors().filter_map(ElementRef::wrap).map(|element| Element { element })
    }

    /// Whether `other` is this element or lies inside it.
    pub fn contains(&self, other: &Element<'a>) -> bool {
        self.is_same(other) || other.ancestors().any(|ancestor| ancestor.is_same(self))
    }

    /// Whether both handles point at the same node.
    pub fn is_same(&self, other: &Element<'a>) -> bool {
        self.element.id() == other.element.id()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| GleanError::Internal(format!("Invalid selector {:?}: {}", selector, e)))
}

/// Detach every element with one of the given names from the tree.
fn detach_elements(html: &mut Html, tags: &[&str]) {
    let ids: Vec<_> = html
        .tree
        .nodes()
        .filter(|node| node.value().as_element().is_some_and(|el| tags.contains(&el.name())))
        .map(|node| node.id())
        .collect();

    if !ids.is_empty() {
        tracing::debug!(count = ids.len(), "detaching noise elements left after parsing");
    }

    for id in ids {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}
