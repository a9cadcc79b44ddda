//! Core analysis logic.
//!
//! This module contains:
//! - Policy: threshold classification and context limits
//! - Suite: question suite definitions and loading
//! - Prompt: chat request construction
//! - Analyzer: question -> completion -> grounded report

pub mod analyzer;
pub mod policy;
pub mod prompt;
pub mod suite;

// Re-export commonly used types
pub use analyzer::{compute_hash, Analyzer, GroundingScorer, SuiteRun};
pub use policy::{GroundingPolicy, PolicyError};
pub use prompt::{build_request, user_prompt, SYSTEM_PROMPT};
pub use suite::{QuestionCategory, QuestionSuite};
