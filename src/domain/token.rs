//! Tokens emitted by a language model.
//!
//! A token carries no offsets of its own. Its span in the response text is
//! derived by summing the lengths of every token before it, so the spans are
//! only meaningful for a stream that is ordered and contiguous.

use serde::{Deserialize, Serialize};

/// One emitted token and the log-probability the model assigned to it
///
/// A token can end partway through a multi-byte character. Chat APIs then
/// send an escaped `token` string and carry the raw UTF-8 in `bytes`, which is
/// what the span length is taken from when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Literal token text (accepts the `token` key used by chat APIs)
    #[serde(alias = "token")]
    pub text: String,
    /// Natural log of the token's probability
    pub logprob: f64,
    /// Raw UTF-8 bytes of the token, when the source reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<Vec<u8>>,
}

impl Token {
    /// Create a new token
    pub fn new(text: impl Into<String>, logprob: f64) -> Self {
        Self {
            text: text.into(),
            logprob,
            bytes: None,
        }
    }

    /// Attach the raw bytes reported for this token
    pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.bytes = Some(bytes);
        self
    }

    /// Bytes this token contributes to the response text
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_deref().unwrap_or(self.text.as_bytes())
    }

    /// Span length in UTF-8 bytes
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the token contributes no bytes
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Derive the `[start, end)` byte span of every token in stream order.
///
/// This is a pure fold over the stream: the cursor lives inside the iterator
/// and never escapes it.
pub fn token_spans(tokens: &[Token]) -> impl Iterator<Item = (usize, usize)> + '_ {
    tokens.iter().scan(0usize, |cursor, token| {
        let start = *cursor;
        *cursor += token.len();
        Some((start, *cursor))
    })
}

/// Concatenate token bytes back into a string
pub fn reconstruct(tokens: &[Token]) -> String {
    let bytes: Vec<u8> = tokens.iter().flat_map(|t| t.as_bytes()).copied().collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
