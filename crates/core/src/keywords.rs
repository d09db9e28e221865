//! Case-insensitive keyword counting.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::{TextMode, normalize};
use crate::{GleanError, Result};

/// What counts as one occurrence of a keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Non-overlapping literal substrings ("rain" hits "rainfall").
    #[default]
    Substring,
    /// Occurrences bounded by word boundaries on both sides.
    WholeWord,
}

/// One keyword's hit count inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone)]
struct Keyword {
    needle: String,
    word_pattern: Option<Regex>,
}

/// The caller's keywords, normalized once per request.
///
/// Keywords are trimmed, lower-cased and put through the same text mode as
/// the block text. Blank entries are dropped and duplicates collapse onto
/// their first occurrence.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
    threshold: usize,
}

impl KeywordSet {
    /// Builds the set.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::Validation`] for a zero threshold.
    pub fn new<S: AsRef<str>>(keywords: &[S], threshold: usize, mode: CountMode, text_mode: TextMode) -> Result<Self> {
        if threshold == 0 {
            return Err(GleanError::Validation("match threshold must be at least 1".to_string()));
        }

        let mut set = Self { keywords: Vec::new(), threshold };
        for raw in keywords {
            let needle = normalize(raw.as_ref(), text_mode).to_lowercase();
            if needle.is_empty() || set.keywords.iter().any(|k| k.needle == needle) {
                continue;
            }

            let word_pattern = match mode {
                CountMode::Substring => None,
                CountMode::WholeWord => Some(
                    Regex::new(&whole_word_pattern(&needle))
                        .map_err(|e| GleanError::Internal(format!("keyword pattern for {:?}: {}", needle, e)))?,
                ),
            };

            set.keywords.push(Keyword { needle, word_pattern });
        }

        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Keywords meeting the threshold in `text`, in the caller's order.
    ///
    /// `text` is lower-cased here; callers pass normalized block text.
    pub fn match_text(&self, text: &str) -> Vec<KeywordCount> {
        let haystack = text.to_lowercase();
        self.keywords
            .iter()
            .filter_map(|keyword| {
                let count = match &keyword.word_pattern {
                    Some(pattern) => pattern.find_iter(&haystack).count(),
                    None => haystack.matches(keyword.needle.as_str()).count(),
                };
                (count >= self.threshold).then(|| KeywordCount { keyword: keyword.needle.clone(), count })
            })
            .collect()
    }
}

/// Pattern for `needle` as a whole word.
///
/// A boundary is only required on an edge that is a word character, so
/// keywords such as `c++` or `u.s.` still match.
fn whole_word_pattern(needle: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let start = if needle.starts_with(is_word) { r"\b" } else { "" };
    let end = if needle.ends_with(is_word) { r"\b" } else { "" };
    format!("{}{}{}", start, regex::escape(needle), end)
}

/// Sum of qualifying counts.
pub fn total_count(matched: &[KeywordCount]) -> usize {
    matched.iter().map(|k| k.count).sum()
}
