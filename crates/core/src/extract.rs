//! Keyword matching engine.
//!
//! This module provides the primary API: the [`Extractor`] struct, its
//! [`MatchConfig`], and the one-liners [`find_matches`] and [`clean_text`].
//!
//! # Example
//!
//! ```rust
//! use glean_core::{MatchConfig, MatchResult, find_matches};
//!
//! let html = "<article><h1>Rain</h1><p>rain rain rain</p></article>";
//! let config = MatchConfig::builder().match_threshold(2).build();
//!
//! match find_matches(html, &["rain"], &config).unwrap() {
//!     MatchResult::Best(best) => {
//!         assert_eq!(best.heading.as_deref(), Some("Rain"));
//!         assert_eq!(best.total_keywords_matched, 3);
//!     }
//!     MatchResult::All(_) => unreachable!(),
//! }
//! ```

use std::borrow::Cow;
use std::time::Instant;

use url::Url;

use crate::assemble::{self, MatchResult, ResultShape, SnippetLimit};
use crate::discovery::{self, Block, DEFAULT_MAX_BLOCKS_PER_PASS, DiscoveryPolicy};
use crate::keywords::{CountMode, KeywordSet};
use crate::parse::Document;
use crate::preprocess::PreprocessConfig;
use crate::resolve::{self, DEFAULT_DATE_WINDOW};
use crate::text::{self, TextMode};
use crate::{GleanError, Result};

/// Default ceiling on input size: 5 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;

/// Configuration for a matching run.
///
/// The default is the best-match preset.
///
/// # Example
///
/// ```rust
/// use glean_core::{MatchConfig, SnippetLimit};
///
/// let config = MatchConfig::builder()
///     .match_threshold(3)
///     .snippet_limit(SnippetLimit::Chars(400))
///     .want_date(true)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Which tag types are candidate blocks (default: fallback cascade).
    pub discovery_policy: DiscoveryPolicy,

    /// Minimum count for a keyword to qualify (default: 1).
    pub match_threshold: usize,

    /// Substring or whole-word counting (default: substring).
    pub count_mode: CountMode,

    /// Standard or alphanumeric-only normalization (default: standard).
    pub text_mode: TextMode,

    /// Whether the heading's own text counts toward keyword hits (default: false).
    pub count_heading: bool,

    /// Whether to resolve publication dates (default: false).
    pub want_date: bool,

    /// Bound on returned snippets (default: 100 words).
    pub snippet_limit: SnippetLimit,

    /// Base for resolving relative links (default: none).
    pub base_url: Option<Url>,

    /// Best match or all matches (default: best match).
    pub result_shape: ResultShape,

    /// Elements examined per discovery pass (default: 50).
    pub max_blocks_per_pass: usize,

    /// Whether all-matches mode continues past the first matching pass (default: false).
    pub accumulate_passes: bool,

    /// Characters of block text searched for a date (default: 300).
    pub date_window: usize,

    /// Largest accepted document in bytes (default: 5 MiB).
    pub max_input_bytes: usize,

    pub preprocess: PreprocessConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::best_match()
    }
}

impl MatchConfig {
    /// Creates a new builder for MatchConfig.
    pub fn builder() -> MatchConfigBuilder {
        MatchConfigBuilder::new()
    }

    /// Single top-scoring block, any occurrence qualifies, 100-word snippet.
    pub fn best_match() -> Self {
        Self {
            discovery_policy: DiscoveryPolicy::FallbackCascade,
            match_threshold: 1,
            count_mode: CountMode::Substring,
            text_mode: TextMode::Standard,
            count_heading: false,
            want_date: false,
            snippet_limit: SnippetLimit::Words(100),
            base_url: None,
            result_shape: ResultShape::BestMatch,
            max_blocks_per_pass: DEFAULT_MAX_BLOCKS_PER_PASS,
            accumulate_passes: false,
            date_window: DEFAULT_DATE_WINDOW,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            preprocess: PreprocessConfig::default(),
        }
    }

    /// Every block with a recurring mention, 1000-character snippets, dates on.
    pub fn all_matches() -> Self {
        Self {
            match_threshold: 2,
            want_date: true,
            snippet_limit: SnippetLimit::Chars(1000),
            result_shape: ResultShape::AllMatches,
            ..Self::best_match()
        }
    }
}

/// Builder for MatchConfig.
///
/// # Example
///
/// ```rust
/// use glean_core::{DiscoveryPolicy, MatchConfig};
///
/// let config = MatchConfig::builder()
///     .all_matches()
///     .discovery_policy(DiscoveryPolicy::SemanticFirst)
///     .accumulate_passes(true)
///     .build();
/// assert_eq!(config.match_threshold, 2);
/// ```
pub struct MatchConfigBuilder {
    config: MatchConfig,
}

impl MatchConfigBuilder {
    /// Creates a new builder with the best-match preset.
    pub fn new() -> Self {
        Self { config: MatchConfig::default() }
    }

    /// Starts over from the all-matches preset, keeping the base URL.
    pub fn all_matches(mut self) -> Self {
        self.config = MatchConfig { base_url: self.config.base_url.take(), ..MatchConfig::all_matches() };
        self
    }

    pub fn discovery_policy(mut self, value: DiscoveryPolicy) -> Self {
        self.config.discovery_policy = value;
        self
    }

    /// Sets the minimum keyword count.
    pub fn match_threshold(mut self, value: usize) -> Self {
        self.config.match_threshold = value;
        self
    }

    pub fn count_mode(mut self, value: CountMode) -> Self {
        self.config.count_mode = value;
        self
    }

    /// Sets whether punctuation is stripped before matching.
    pub fn strict_text(mut self, value: bool) -> Self {
        self.config.text_mode = if value { TextMode::Strict } else { TextMode::Standard };
        self
    }

    pub fn count_heading(mut self, value: bool) -> Self {
        self.config.count_heading = value;
        self
    }

    /// Sets whether publication dates are resolved.
    pub fn want_date(mut self, value: bool) -> Self {
        self.config.want_date = value;
        self
    }

    pub fn snippet_limit(mut self, value: SnippetLimit) -> Self {
        self.config.snippet_limit = value;
        self
    }

    /// Sets the base URL for relative links.
    pub fn base_url(mut self, value: Url) -> Self {
        self.config.base_url = Some(value);
        self
    }

    pub fn result_shape(mut self, value: ResultShape) -> Self {
        self.config.result_shape = value;
        self
    }

    pub fn max_blocks_per_pass(mut self, value: usize) -> Self {
        self.config.max_blocks_per_pass = value;
        self
    }

    pub fn accumulate_passes(mut self, value: bool) -> Self {
        self.config.accumulate_passes = value;
        self
    }

    pub fn date_window(mut self, value: usize) -> Self {
        self.config.date_window = value;
        self
    }

    /// Sets the input size ceiling in bytes.
    pub fn max_input_bytes(mut self, value: usize) -> Self {
        self.config.max_input_bytes = value;
        self
    }

    pub fn preprocess(mut self, value: PreprocessConfig) -> Self {
        self.config.preprocess = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> MatchConfig {
        self.config
    }
}

impl Default for MatchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main entry point for keyword matching.
///
/// An extractor holds only its configuration, so one instance can serve any
/// number of documents. Every run parses its own document.
///
/// # Example
///
/// ```rust
/// use glean_core::{Extractor, MatchConfig};
///
/// let extractor = Extractor::with_config(MatchConfig::all_matches());
/// let html = "<article>storm storm</article><article>calm</article>";
/// let result = extractor.run(html, &["storm"]).unwrap();
/// assert_eq!(result.matched_blocks(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: MatchConfig,
}

impl Extractor {
    /// Creates an extractor with the best-match preset.
    pub fn new() -> Self {
        Self { config: MatchConfig::default() }
    }

    pub fn with_config(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Finds the blocks of `html` that mention `keywords`.
    ///
    /// # Errors
    ///
    /// - [`GleanError::ResourceLimit`] when `html` exceeds `max_input_bytes`
    /// - [`GleanError::Validation`] for an empty document or a zero threshold
    /// - [`GleanError::Internal`] for unexpected failures while scanning
    #[tracing::instrument(skip_all, fields(bytes = html.len(), keywords = keywords.len()))]
    pub fn run<S: AsRef<str>>(&self, html: &str, keywords: &[S]) -> Result<MatchResult> {
        let start = Instant::now();
        self.validate(html)?;

        let config = &self.config;
        let keywords = KeywordSet::new(keywords, config.match_threshold, config.count_mode, config.text_mode)?;
        let doc = Document::parse_with_config(html, &config.preprocess)?;

        let mut result = match config.result_shape {
            ResultShape::BestMatch => self.best_match(&doc, &keywords)?,
            ResultShape::AllMatches => self.all_matches(&doc, &keywords)?,
        };
        drop(doc);

        result.set_processing_time(start.elapsed().as_secs_f64());
        tracing::debug!(
            blocks = result.matched_blocks(),
            total = result.total_keywords(),
            seconds = result.processing_time_seconds(),
            "matching finished"
        );
        Ok(result)
    }

    /// Line-oriented clean text of the whole document.
    ///
    /// # Errors
    ///
    /// Same input checks as [`Extractor::run`].
    pub fn clean(&self, html: &str) -> Result<String> {
        self.validate(html)?;
        let doc = Document::parse_with_config(html, &self.config.preprocess)?;
        Ok(text::document_clean_text(&doc))
    }

    fn validate(&self, html: &str) -> Result<()> {
        if html.len() > self.config.max_input_bytes {
            return Err(GleanError::ResourceLimit { size: html.len(), limit: self.config.max_input_bytes });
        }
        if html.trim().is_empty() {
            return Err(GleanError::Validation("document is empty".to_string()));
        }
        Ok(())
    }

    fn best_match(&self, doc: &Document, keywords: &KeywordSet) -> Result<MatchResult> {
        let clean_text = text::document_clean_text(doc);

        for &tag in self.passes(keywords) {
            let matched = self.matching_blocks(doc, tag, keywords)?;
            let Some(best) = assemble::select_best(&matched) else {
                continue;
            };

            let mut best = best.clone();
            self.resolve_metadata(doc, &mut best, &mut None);
            tracing::debug!(pass = tag, position = best.position, total = best.total_count(), "best block");
            return Ok(MatchResult::Best(assemble::assemble_best(Some(&best), clean_text, self.config.snippet_limit)));
        }

        Ok(MatchResult::Best(assemble::assemble_best(None, clean_text, self.config.snippet_limit)))
    }

    fn all_matches(&self, doc: &Document, keywords: &KeywordSet) -> Result<MatchResult> {
        let mut accepted: Vec<Block<'_>> = Vec::new();
        let mut doc_url = None;

        for &tag in self.passes(keywords) {
            let earlier = accepted.len();
            for mut block in self.matching_blocks(doc, tag, keywords)? {
                if accepted[..earlier].iter().any(|prior| prior.overlaps(&block)) {
                    tracing::debug!(pass = tag, position = block.position, "skipping block inside an earlier match");
                    continue;
                }
                self.resolve_metadata(doc, &mut block, &mut doc_url);
                accepted.push(block);
            }

            if accepted.len() > earlier && !self.config.accumulate_passes {
                break;
            }
        }

        Ok(MatchResult::All(assemble::assemble_all(&accepted, self.config.snippet_limit)))
    }

    fn passes(&self, keywords: &KeywordSet) -> &'static [&'static str] {
        if keywords.is_empty() { &[] } else { self.config.discovery_policy.passes() }
    }

    /// Blocks of one pass whose context text meets the threshold.
    fn matching_blocks<'a>(
        &self, doc: &'a Document, tag: &'static str, keywords: &KeywordSet,
    ) -> Result<Vec<Block<'a>>> {
        let mut matched = Vec::new();
        for mut block in discovery::discover_pass(doc, tag, self.config.max_blocks_per_pass)? {
            match resolve::find_heading(&block.element, self.config.text_mode) {
                Ok(Some((element, heading))) => {
                    block.heading_element = Some(element);
                    block.heading = Some(heading);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(pass = tag, position = block.position, error = %e, "heading lookup failed"),
            }

            let skip = if self.config.count_heading { None } else { block.heading_element.as_ref() };
            block.text = text::element_text_without(&block.element, skip, self.config.text_mode);
            block.matched = keywords.match_text(&block.text);

            if !block.matched.is_empty() {
                matched.push(block);
            }
        }
        Ok(matched)
    }

    /// URL and date of an accepted block. Failures leave the field empty.
    fn resolve_metadata(&self, doc: &Document, block: &mut Block<'_>, doc_url: &mut Option<Option<String>>) {
        let base = self.config.base_url.as_ref();
        let fallback = doc_url.get_or_insert_with(|| resolve::document_url(doc, base));

        block.url = match resolve::resolve_url(&block.element, base, fallback.as_deref()) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(pass = block.pass, position = block.position, error = %e, "url lookup failed");
                None
            }
        };

        if self.config.want_date {
            let full_text = match (&block.heading_element, self.config.count_heading) {
                (Some(_), false) => Cow::Owned(text::element_text(&block.element, self.config.text_mode)),
                _ => Cow::Borrowed(block.text.as_str()),
            };
            block.date = resolve::resolve_date(&block.element, &full_text, self.config.date_window);
        }
    }
}

/// Convenience function for one-off matching.
///
/// # Errors
///
/// See [`Extractor::run`].
pub fn find_matches<S: AsRef<str>>(html: &str, keywords: &[S], config: &MatchConfig) -> Result<MatchResult> {
    Extractor::with_config(config.clone()).run(html, keywords)
}

/// Convenience function for the clean text of a document with defaults.
///
/// # Example
///
/// ```rust
/// use glean_core::clean_text;
///
/// let text = clean_text("<body><h1>Title</h1>\n<script>x()</script>\n<p>Body</p></body>").unwrap();
/// assert_eq!(text, "Title\nBody");
/// ```
pub fn clean_text(html: &str) -> Result<String> {
    Extractor::new().clean(html)
}
