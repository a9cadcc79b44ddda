//! Pattern matches over a response text.
//!
//! Matches are produced left to right and never overlap; the aligner relies
//! on that ordering and does not re-check it.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Default identifier pattern: a canonical hyphenated UUID
pub const UUID_PATTERN: &str = r"\b[0-9a-f]{8}(-[0-9a-f]{4}){3}-[0-9a-f]{12}\b";

/// A located substring with its `[start, end)` byte offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMatch {
    /// The matched substring
    pub text: String,
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl TextMatch {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

impl From<regex::Match<'_>> for TextMatch {
    fn from(m: regex::Match<'_>) -> Self {
        Self::new(m.as_str(), m.start(), m.end())
    }
}

/// Something that can locate ordered, non-overlapping matches in a text
pub trait PatternMatcher: Send + Sync {
    /// Return matches sorted by start offset
    fn find_matches(&self, text: &str) -> Vec<TextMatch>;
}

/// Regex-backed matcher
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    /// Compile a pattern
    pub fn new(pattern: &str, case_insensitive: bool) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .with_context(|| format!("Invalid match pattern: {}", pattern))?;

        Ok(Self { regex })
    }

    /// Case-insensitive UUID matcher
    pub fn uuid() -> Result<Self> {
        Self::new(UUID_PATTERN, true)
    }
}

impl PatternMatcher for RegexMatcher {
    fn find_matches(&self, text: &str) -> Vec<TextMatch> {
        // find_iter yields leftmost, non-overlapping matches in order
        self.regex.find_iter(text).map(TextMatch::from).collect()
    }
}
