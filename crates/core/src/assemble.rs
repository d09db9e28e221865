//! Response shapes and snippet truncation.
//!
//! The two shapes mirror what downstream consumers already parse: a single
//! best block with the whole document's clean text, or every qualifying
//! block with aggregate counts.

use serde::{Deserialize, Serialize};

use crate::discovery::Block;
use crate::keywords::KeywordCount;

/// Which response shape to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    /// The single top-scoring block.
    #[default]
    BestMatch,
    /// Every qualifying block.
    AllMatches,
}

/// Upper bound on returned snippet text.
///
/// Serialized as `{"words": 100}` or `{"chars": 400}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnippetLimit {
    Words(usize),
    Chars(usize),
}

impl Default for SnippetLimit {
    fn default() -> Self {
        Self::Words(100)
    }
}

impl SnippetLimit {
    /// Cut `text` down to the limit. Never lengthens it.
    pub fn truncate(&self, text: &str) -> String {
        match *self {
            Self::Words(max) => text.split_whitespace().take(max).collect::<Vec<_>>().join(" "),
            Self::Chars(max) => match text.char_indices().nth(max) {
                Some((end, _)) => text[..end].trim_end().to_string(),
                None => text.to_string(),
            },
        }
    }

    /// Whether `text` is within the limit.
    pub fn fits(&self, text: &str) -> bool {
        match *self {
            Self::Words(max) => text.split_whitespace().count() <= max,
            Self::Chars(max) => text.chars().count() <= max,
        }
    }
}

/// One qualifying block in the all-matches shape.
#[derive(Debug, Clone, Serialize)]
pub struct BlockMatch {
    pub heading: Option<String>,
    pub article_context: String,
    pub article_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub matched_keywords: Vec<KeywordCount>,
}

impl BlockMatch {
    /// Sum of this block's keyword counts.
    pub fn total_count(&self) -> usize {
        crate::keywords::total_count(&self.matched_keywords)
    }
}

/// Best-match response shape.
#[derive(Debug, Clone, Serialize)]
pub struct BestMatch {
    /// Whether any block qualified
    pub matched: bool,
    pub matched_keywords: Vec<KeywordCount>,
    pub heading: Option<String>,
    pub article_context: Option<String>,
    pub article_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Line-oriented text of the whole document
    #[serde(rename = "cleanText")]
    pub clean_text: String,
    pub total_keywords_matched: usize,
    pub processing_time_seconds: f64,
}

/// All-matches response shape.
#[derive(Debug, Clone, Serialize)]
pub struct AllMatches {
    pub total_matched_articles: usize,
    pub total_keywords_matched: usize,
    pub matches: Vec<BlockMatch>,
    pub processing_time_seconds: f64,
}

/// Result of one engine run.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MatchResult {
    Best(BestMatch),
    All(AllMatches),
}

impl MatchResult {
    /// Number of blocks in the response.
    pub fn matched_blocks(&self) -> usize {
        match self {
            Self::Best(best) => usize::from(best.matched),
            Self::All(all) => all.total_matched_articles,
        }
    }

    /// Sum of keyword counts in the response.
    pub fn total_keywords(&self) -> usize {
        match self {
            Self::Best(best) => best.total_keywords_matched,
            Self::All(all) => all.total_keywords_matched,
        }
    }

    pub fn processing_time_seconds(&self) -> f64 {
        match self {
            Self::Best(best) => best.processing_time_seconds,
            Self::All(all) => all.processing_time_seconds,
        }
    }

    pub(crate) fn set_processing_time(&mut self, seconds: f64) {
        match self {
            Self::Best(best) => best.processing_time_seconds = seconds,
            Self::All(all) => all.processing_time_seconds = seconds,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Highest total count wins; ties go to the earliest block.
pub fn select_best<'a, 'b>(blocks: &'b [Block<'a>]) -> Option<&'b Block<'a>> {
    blocks.iter().fold(None, |best: Option<&Block<'a>>, block| match best {
        Some(current) if current.total_count() >= block.total_count() => Some(current),
        _ => Some(block),
    })
}

/// Best-match shape from the winning block, if any.
pub fn assemble_best(best: Option<&Block<'_>>, clean_text: String, limit: SnippetLimit) -> BestMatch {
    match best {
        Some(block) => BestMatch {
            matched: true,
            matched_keywords: block.matched.clone(),
            heading: block.heading.clone(),
            article_context: Some(limit.truncate(&block.text)),
            article_url: block.url.clone(),
            date: block.date.clone(),
            clean_text,
            total_keywords_matched: block.total_count(),
            processing_time_seconds: 0.0,
        },
        None => BestMatch {
            matched: false,
            matched_keywords: Vec::new(),
            heading: None,
            article_context: None,
            article_url: None,
            date: None,
            clean_text,
            total_keywords_matched: 0,
            processing_time_seconds: 0.0,
        },
    }
}

/// All-matches shape; totals are computed from the blocks included.
pub fn assemble_all(blocks: &[Block<'_>], limit: SnippetLimit) -> AllMatches {
    let matches: Vec<BlockMatch> = blocks
        .iter()
        .map(|block| BlockMatch {
            heading: block.heading.clone(),
            article_context: limit.truncate(&block.text),
            article_url: block.url.clone(),
            date: block.date.clone(),
            matched_keywords: block.matched.clone(),
        })
        .collect();

    AllMatches {
        total_matched_articles: matches.len(),
        total_keywords_matched: matches.iter().map(BlockMatch::total_count).sum(),
        matches,
        processing_time_seconds: 0.0,
    }
}
