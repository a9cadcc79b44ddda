//! groundcheck - token log-probability grounding for LLM answers
//!
//! Asks a language model questions about a dataset, requests the per-token
//! log-probabilities of its answer, and measures how confidently the model
//! committed to each identifier it mentions. Identifiers the model was unsure
//! of are likely fabricated rather than read from the data.
//!
//! # Architecture
//!
//! - A pattern matcher locates identifiers (byte offsets) in the answer
//! - Token spans are derived from cumulative token lengths
//! - Each token's log-probability is attributed to the matches it overlaps
//! - A match's confidence is the geometric mean of its tokens' probabilities
//! - A caller-side policy turns confidence into a grounded/fabricated verdict
//!
//! # Modules
//!
//! - `evidence`: Span alignment and confidence aggregation (pure)
//! - `domain`: Data structures (Token, TextMatch, reports)
//! - `core`: Policy, prompts, question suites, Analyzer
//! - `adapters`: LLM backends (OpenRouter)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Ask one question
//! groundcheck analyze --data data.csv --question "Was transaction <id> returned?"
//!
//! # Run the built-in question suite
//! groundcheck suite --data data.csv
//!
//! # Score a saved response offline
//! groundcheck score --text answer.txt --tokens tokens.json
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod evidence;

// Re-export main types at crate root for convenience
pub use crate::core::{Analyzer, GroundingPolicy, GroundingScorer, QuestionSuite};
pub use domain::{AnalysisReport, MatchConfidence, TextMatch, Token, Verdict};
pub use evidence::{match_confidence, score, Attribution};
