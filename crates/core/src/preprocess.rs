use std::sync::LazyLock;

use regex::Regex;

/// Elements whose whole subtree is dropped before any text is read.
pub const NOISE_TAGS: &[&str] = &["script", "style", "iframe", "canvas", "svg"];

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove noscript tags
    pub remove_noscript: bool,
    /// Whether to remove HTML comments
    pub remove_comments: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { remove_noscript: true, remove_comments: true }
    }
}

impl PreprocessConfig {
    /// Tag names removed together with their content.
    pub fn removed_tags(&self) -> Vec<&'static str> {
        let mut tags = NOISE_TAGS.to_vec();
        if self.remove_noscript {
            tags.push("noscript");
        }
        tags
    }
}

/// Preprocess HTML by removing noise elements and comments.
///
/// This is a streaming pass over the source text. The parsed tree gets a
/// second sweep in [`crate::Document::parse_with_config`], so anything this
/// pass misses on broken markup is still removed.
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut processed = remove_unwanted_tags(html, &config.removed_tags());

    if config.remove_comments {
        processed = remove_comments(&processed);
    }

    processed
}

/// Remove the given elements and everything inside them
fn remove_unwanted_tags(html: &str, tags: &[&str]) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: tags
                .iter()
                .map(|tag| {
                    lol_html::element!(*tag, |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .collect(),
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if let Err(e) = rewriter.write(html.as_bytes()) {
        tracing::debug!(error = %e, "noise pre-pass failed, parsing raw input");
        return html.to_string();
    }

    if let Err(e) = rewriter.end() {
        tracing::debug!(error = %e, "noise pre-pass failed, parsing raw input");
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}

/// Remove HTML comments from the document
fn remove_comments(html: &str) -> String {
    COMMENT.replace_all(html, "").into_owned()
}
