//! Adapter interfaces for LLM backends.
//!
//! An adapter sends one chat exchange and returns the response text together
//! with the token stream, when the backend supplies log-probabilities.

pub mod openrouter;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::Token;

pub use openrouter::OpenRouterAdapter;

/// A single system + user exchange
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Output from a chat completion
#[derive(Debug, Clone)]
pub struct ChatOutput {
    /// The response text
    pub content: String,

    /// Emitted tokens with log-probabilities (None if the backend returned none)
    pub tokens: Option<Vec<Token>>,

    /// Model that served the request (if reported)
    pub model: Option<String>,

    /// Tokens used (if available)
    pub tokens_used: Option<u64>,
}

impl ChatOutput {
    /// Create an output with just content
    pub fn new(content: String) -> Self {
        Self {
            content,
            tokens: None,
            model: None,
            tokens_used: None,
        }
    }

    /// Attach a token stream
    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = Some(tokens);
        self
    }
}

/// Trait for chat backends
#[async_trait]
pub trait ChatAdapter: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Run one completion with log-probabilities requested
    async fn complete(&self, request: &ChatRequest) -> Result<ChatOutput>;
}
