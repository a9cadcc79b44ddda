//! Token-to-match span alignment
//!
//! Walks the token stream once, deriving each token's byte span from the
//! cumulative length of the tokens before it, and collects the log-probability
//! of every token that overlaps a match.
//!
//! # Preconditions (not checked)
//!
//! - Matches are sorted by `start` and do not overlap
//! - Token spans are contiguous and index the same text as the matches
//!
//! Violating either silently yields misattributed evidence.

use serde::{Deserialize, Serialize};

use crate::domain::{token_spans, TextMatch, Token};

/// How a token that overlaps more than one match is attributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribution {
    /// Every match the token intersects receives its log-probability
    #[default]
    AllOverlapping,
    /// Only the match under the cursor receives it; later matches sharing
    /// the token get nothing from it
    CurrentMatch,
}

impl Attribution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribution::AllOverlapping => "all_overlapping",
            Attribution::CurrentMatch => "current_match",
        }
    }
}

impl std::str::FromStr for Attribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_overlapping" | "all-overlapping" => Ok(Attribution::AllOverlapping),
            "current_match" | "current-match" => Ok(Attribution::CurrentMatch),
            other => Err(format!(
                "unknown attribution '{}' (expected all_overlapping or current_match)",
                other
            )),
        }
    }
}

/// Collect per-match token log-probabilities
///
/// Returns one accumulator per match, indexed like `matches`. A match with no
/// overlapping token keeps an empty accumulator. Runs in
/// O(tokens + matches) for `CurrentMatch`; `AllOverlapping` adds only the
/// extra matches a token actually intersects.
pub fn align(tokens: &[Token], matches: &[TextMatch], attribution: Attribution) -> Vec<Vec<f64>> {
    let mut evidence: Vec<Vec<f64>> = vec![Vec::new(); matches.len()];
    if matches.is_empty() {
        return evidence;
    }

    let mut cursor = 0;

    for (token, (token_start, token_end)) in tokens.iter().zip(token_spans(tokens)) {
        // Matches ending at or before this token can receive nothing more
        while cursor < matches.len() && matches[cursor].end <= token_start {
            cursor += 1;
        }

        if cursor == matches.len() {
            break;
        }

        match attribution {
            Attribution::CurrentMatch => {
                if token_end > matches[cursor].start {
                    evidence[cursor].push(token.logprob);
                }
            }
            Attribution::AllOverlapping => {
                // Every match from the cursor on ends after token_start, so
                // intersection only depends on where it starts
                let mut inner = cursor;
                while inner < matches.len() && matches[inner].start < token_end {
                    evidence[inner].push(token.logprob);
                    inner += 1;
                }
            }
        }
    }

    evidence
}
