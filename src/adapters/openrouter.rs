//! OpenRouter adapter (OpenAI-compatible chat completions).
//!
//! Requests `logprobs` so the response carries the emitted token stream.
//! Works against any endpoint speaking the same wire format.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{ChatAdapter, ChatOutput, ChatRequest};
use crate::config::ClientSettings;
use crate::domain::Token;

/// Chat completions client
pub struct OpenRouterAdapter {
    /// API base URL (e.g. https://openrouter.ai/api/v1)
    base_url: String,
    /// Bearer token
    api_key: String,
    /// Model identifier
    model: String,
    /// Sampling temperature
    temperature: f64,
    /// Alternatives requested per position
    top_logprobs: u8,
    /// HTTP client
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
    logprobs: bool,
    top_logprobs: u8,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    logprobs: Option<ChoiceLogprobs>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceLogprobs {
    #[serde(default)]
    content: Option<Vec<Token>>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

impl OpenRouterAdapter {
    /// Create a client
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.8,
            top_logprobs: 5,
            client,
        })
    }

    /// Create from resolved settings, reading the API key from the environment
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).with_context(|| {
            format!(
                "API key not set: export {} to call {}",
                settings.api_key_env, settings.base_url
            )
        })?;

        let mut adapter = Self::new(
            settings.base_url.clone(),
            api_key,
            settings.model.clone(),
            Duration::from_secs(settings.timeout_seconds),
        )?;
        adapter.temperature = settings.temperature;
        adapter.top_logprobs = settings.top_logprobs;
        Ok(adapter)
    }

    /// Build API URL
    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request_body<'a>(&'a self, request: &'a ChatRequest) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: self.temperature,
            logprobs: true,
            top_logprobs: self.top_logprobs,
        }
    }
}

/// Convert a decoded response into adapter output
fn into_output(response: CompletionResponse) -> Result<ChatOutput> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .context("Completion response contained no choices")?;

    let tokens = choice.logprobs.and_then(|lp| lp.content);
    if tokens.is_none() {
        warn!("Response carried no logprobs; confidence cannot be computed");
    }

    Ok(ChatOutput {
        content: choice.message.content.unwrap_or_default(),
        tokens,
        model: response.model,
        tokens_used: response.usage.and_then(|u| u.total_tokens),
    })
}

#[async_trait]
impl ChatAdapter for OpenRouterAdapter {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatOutput> {
        let url = self.api_url();
        debug!(%url, "Sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .with_context(|| format!("Failed to send completion request to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Completion API error ({}): {}", status, body.trim());
        }

        let decoded: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;

        let output = into_output(decoded)?;
        debug!(
            tokens = output.tokens.as_ref().map(|t| t.len()).unwrap_or(0),
            "Completion received"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{reconstruct, PatternMatcher, RegexMatcher};
    use crate::evidence::match_confidence;

    fn adapter() -> OpenRouterAdapter {
        OpenRouterAdapter::new(
            "https://openrouter.ai/api/v1/",
            "KEY",
            "openai/gpt-4o-mini",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_api_url() {
        assert_eq!(
            adapter().api_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body_requests_logprobs() {
        let adapter = adapter();
        let request = ChatRequest::new("sys", "usr");
        let body = serde_json::to_value(adapter.request_body(&request)).unwrap();

        assert_eq!(body["model"], "openai/gpt-4o-mini");
        assert_eq!(body["logprobs"], true);
        assert_eq!(body["top_logprobs"], 5);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");
    }

    #[test]
    fn test_parse_response_with_logprobs() {
        let json = r#"{
            "model": "openai/gpt-4o-mini",
            "choices": [{
                "message": {"role": "assistant", "content": "The id"},
                "logprobs": {"content": [
                    {"token": "The", "logprob": -0.1, "bytes": [84, 104, 101], "top_logprobs": []},
                    {"token": " id", "logprob": -0.2, "bytes": [32, 105, 100], "top_logprobs": []}
                ]}
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }"#;

        let output = into_output(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(output.content, "The id");
        assert_eq!(
            output.tokens.unwrap(),
            vec![
                Token::new("The", -0.1).with_bytes(vec![84, 104, 101]),
                Token::new(" id", -0.2).with_bytes(vec![32, 105, 100]),
            ]
        );
        assert_eq!(output.tokens_used, Some(12));
    }

    #[test]
    fn test_split_character_keeps_spans_aligned() {
        // the accented letter arrives as two byte-level tokens ahead of the id
        let json = r#"{
            "choices": [{
                "message": {"content": "é abc-123"},
                "logprobs": {"content": [
                    {"token": "\\xc3", "logprob": -0.1, "bytes": [195]},
                    {"token": "\\xa9", "logprob": -0.1, "bytes": [169]},
                    {"token": " ", "logprob": -0.1, "bytes": [32]},
                    {"token": "abc-123", "logprob": -0.7, "bytes": [97, 98, 99, 45, 49, 50, 51]}
                ]}
            }]
        }"#;

        let output = into_output(serde_json::from_str(json).unwrap()).unwrap();
        let tokens = output.tokens.unwrap();
        assert_eq!(reconstruct(&tokens), output.content);

        let matches = RegexMatcher::new(r"abc-\d+", false)
            .unwrap()
            .find_matches(&output.content);
        let scored = match_confidence(&matches, Some(&tokens));
        assert_eq!(scored.len(), 1);
        assert!((scored[0].confidence - (-0.7f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_parse_response_without_logprobs() {
        let json = r#"{"choices": [{"message": {"content": "hi"}, "logprobs": null}]}"#;
        let output = into_output(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(output.content, "hi");
        assert!(output.tokens.is_none());
    }

    #[test]
    fn test_parse_response_without_choices() {
        let json = r#"{"choices": []}"#;
        assert!(into_output(serde_json::from_str(json).unwrap()).is_err());
    }
}
