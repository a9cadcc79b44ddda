//! Confidence aggregation.
//!
//! A match's confidence is the geometric mean of the probabilities of the
//! tokens overlapping it, computed as `exp(mean(logprobs))`. Averaging in log
//! space keeps long spans from underflowing and normalizes for span length.

use tracing::trace;

use crate::domain::{MatchConfidence, TextMatch, Token};

use super::spans::{align, Attribution};

/// Geometric-mean probability of a run of token log-probabilities
///
/// Returns 0.0 for an empty slice. That value means "no evidence", not "zero
/// confidence"; callers must check for emptiness before trusting it.
pub fn score(logprobs: &[f64]) -> f64 {
    if logprobs.is_empty() {
        return 0.0;
    }

    let sum: f64 = logprobs.iter().sum();
    (sum / logprobs.len() as f64).exp()
}

/// Score every match that overlaps at least one token
///
/// Uses the default [`Attribution`]. See [`match_confidence_with`].
pub fn match_confidence(matches: &[TextMatch], tokens: Option<&[Token]>) -> Vec<MatchConfidence> {
    match_confidence_with(matches, tokens, Attribution::default())
}

/// Score every match that overlaps at least one token
///
/// An absent or empty token stream, or an empty match list, yields an empty
/// result. Matches with no overlapping token are left out rather than
/// reported as zero. Output order follows `matches`.
pub fn match_confidence_with(
    matches: &[TextMatch],
    tokens: Option<&[Token]>,
    attribution: Attribution,
) -> Vec<MatchConfidence> {
    score_matches(matches, tokens, attribution)
        .into_iter()
        .map(|(m, confidence)| MatchConfidence::new(m.text.clone(), confidence))
        .collect()
}

/// Like [`match_confidence_with`], but keeps a reference to each scored match
/// so callers can report its offsets
pub fn score_matches<'m>(
    matches: &'m [TextMatch],
    tokens: Option<&[Token]>,
    attribution: Attribution,
) -> Vec<(&'m TextMatch, f64)> {
    let tokens = match tokens {
        Some(tokens) if !tokens.is_empty() => tokens,
        _ => return Vec::new(),
    };
    if matches.is_empty() {
        return Vec::new();
    }

    let evidence = align(tokens, matches, attribution);

    matches
        .iter()
        .zip(evidence)
        .filter_map(|(m, logprobs)| {
            if logprobs.is_empty() {
                trace!(text = %m.text, start = m.start, end = m.end, "match has no token evidence");
                return None;
            }
            Some((m, score(&logprobs)))
        })
        .collect()
}
