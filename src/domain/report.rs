//! Scoring results and analysis reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Confidence computed for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfidence {
    /// The matched substring
    pub text: String,
    /// Geometric-mean probability of the overlapping tokens, in (0, 1]
    pub confidence: f64,
}

impl MatchConfidence {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Caller-side classification of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Confidence at or above the threshold
    Grounded,
    /// Confidence below the threshold
    Fabricated,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Grounded => "grounded",
            Verdict::Fabricated => "fabricated",
        }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self, Verdict::Grounded)
    }
}

/// A scored and classified match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
    pub verdict: Verdict,
}

/// Result of asking one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Unique report ID
    pub id: Uuid,
    /// When the analysis finished
    pub ts: DateTime<Utc>,
    /// The question asked
    pub question: String,
    /// Model that produced the response
    pub model: String,
    /// Full response text
    pub response: String,
    /// SHA256 of the data context ("sha256:<hex>")
    pub context_sha256: String,
    /// Whether the response carried a token stream
    pub logprobs_available: bool,
    /// Threshold used for verdicts
    pub threshold: f64,
    /// Matches that received token evidence, in text order
    pub matches: Vec<MatchReport>,
}

impl AnalysisReport {
    /// Matches classified as fabricated
    pub fn fabricated(&self) -> impl Iterator<Item = &MatchReport> {
        self.matches.iter().filter(|m| !m.verdict.is_grounded())
    }
}
