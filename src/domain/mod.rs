//! Domain types for grounding analysis.
//!
//! Tokens and matches are transient values built per analysis call.

pub mod matches;
pub mod report;
pub mod token;

pub use matches::{PatternMatcher, RegexMatcher, TextMatch, UUID_PATTERN};
pub use report::{AnalysisReport, MatchConfidence, MatchReport, Verdict};
pub use token::{reconstruct, token_spans, Token};
