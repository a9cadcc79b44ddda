//! Token-level evidence for pattern matches
//!
//! Given the matches a pattern found in an LLM response and the token stream
//! (with log-probabilities) the model emitted while writing it, this module
//! measures how confidently the model committed to each match.
//!
//! # Design Principles
//!
//! - **Pure**: no I/O, no shared state, infallible on well-typed input.
//! - **Derived offsets**: token spans are recomputed from token lengths on
//!   every call, never stored.
//! - **Honest absence**: a match with no token evidence is omitted, never
//!   reported as zero confidence.
//! - **Mechanism only**: thresholds and verdicts belong to the caller
//!   (see `core::policy`).
//!
//! # Example
//!
//! ```
//! use groundcheck::domain::{TextMatch, Token};
//! use groundcheck::evidence::match_confidence;
//!
//! let tokens = vec![
//!     Token::new("The", -0.1),
//!     Token::new(" id", -0.2),
//!     Token::new(" is", -0.05),
//!     Token::new(" abc-123", -2.3),
//! ];
//! let matches = vec![TextMatch::new("abc-123", 10, 17)];
//!
//! let scored = match_confidence(&matches, Some(&tokens));
//! assert_eq!(scored.len(), 1);
//! assert!((scored[0].confidence - 0.1003).abs() < 1e-3);
//! ```

pub mod score;
pub mod spans;

pub use score::{match_confidence, match_confidence_with, score, score_matches};
pub use spans::{align, Attribution};
