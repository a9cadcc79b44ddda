//! Question analysis.
//!
//! Sends a question plus its data context to a chat adapter, locates
//! identifiers in the answer, scores each one from the token stream and
//! classifies it under the grounding policy.

use anyhow::{Context, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{ChatAdapter, OpenRouterAdapter};
use crate::config::ResolvedConfig;
use crate::domain::{reconstruct, AnalysisReport, MatchReport, PatternMatcher, RegexMatcher, Token};
use crate::evidence::{score_matches, Attribution};

use super::policy::GroundingPolicy;
use super::prompt::build_request;
use super::suite::QuestionSuite;

/// Compute SHA256 of a byte slice as "sha256:<hex>"
pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Offline scoring: matcher + attribution + policy, no model call
pub struct GroundingScorer {
    matcher: Box<dyn PatternMatcher>,
    attribution: Attribution,
    policy: GroundingPolicy,
}

impl GroundingScorer {
    pub fn new(
        matcher: Box<dyn PatternMatcher>,
        attribution: Attribution,
        policy: GroundingPolicy,
    ) -> Self {
        Self {
            matcher,
            attribution,
            policy,
        }
    }

    /// Build from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let grounding = &config.grounding;
        let matcher = RegexMatcher::new(&grounding.pattern, grounding.case_insensitive)?;
        let policy = GroundingPolicy::new(grounding.threshold, grounding.max_context_bytes)?;

        Ok(Self::new(Box::new(matcher), grounding.attribution, policy))
    }

    pub fn policy(&self) -> &GroundingPolicy {
        &self.policy
    }

    pub fn attribution(&self) -> Attribution {
        self.attribution
    }

    /// Find, score and classify every match in a response
    pub fn score(&self, response: &str, tokens: Option<&[Token]>) -> Vec<MatchReport> {
        let matches = self.matcher.find_matches(response);
        debug!(matches = matches.len(), "Located matches");

        score_matches(&matches, tokens, self.attribution)
            .into_iter()
            .map(|(m, confidence)| MatchReport {
                text: m.text.clone(),
                start: m.start,
                end: m.end,
                confidence,
                verdict: self.policy.classify(confidence),
            })
            .collect()
    }
}

/// Outcome of running a suite
#[derive(Debug, Default)]
pub struct SuiteRun {
    /// Reports for questions that completed, with their category
    pub reports: Vec<(String, AnalysisReport)>,
    /// (question, error) for questions that failed
    pub failures: Vec<(String, String)>,
}

/// Asks questions and grounds the answers
pub struct Analyzer {
    adapter: Box<dyn ChatAdapter>,
    scorer: GroundingScorer,
}

impl Analyzer {
    pub fn new(adapter: Box<dyn ChatAdapter>, scorer: GroundingScorer) -> Self {
        Self { adapter, scorer }
    }

    /// Build an OpenRouter-backed analyzer from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let adapter = OpenRouterAdapter::from_settings(&config.client)?;
        let scorer = GroundingScorer::from_config(config)?;
        Ok(Self::new(Box::new(adapter), scorer))
    }

    pub fn scorer(&self) -> &GroundingScorer {
        &self.scorer
    }

    /// Ask one question about the context and ground the answer
    #[instrument(skip(self, context), fields(adapter = %self.adapter.name(), model = %self.adapter.model()))]
    pub async fn analyze(&self, context: &str, question: &str) -> Result<AnalysisReport> {
        let policy = self.scorer.policy();
        policy.validate_context(context)?;

        let request = build_request(context, question);
        let output = self
            .adapter
            .complete(&request)
            .await
            .with_context(|| format!("Completion failed for question: {}", question))?;

        let logprobs_available = output.tokens.as_ref().is_some_and(|t| !t.is_empty());
        match output.tokens.as_deref() {
            Some(tokens) if !tokens.is_empty() => {
                if reconstruct(tokens) != output.content {
                    warn!("Token stream does not reconstruct the response; confidences may be misaligned");
                }
            }
            _ => warn!("No token stream returned; matches cannot be scored"),
        }

        let matches = self.scorer.score(&output.content, output.tokens.as_deref());
        let fabricated = matches.iter().filter(|m| !m.verdict.is_grounded()).count();
        info!(
            matches = matches.len(),
            fabricated,
            tokens_used = output.tokens_used,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            id: Uuid::new_v4(),
            ts: Utc::now(),
            question: question.to_string(),
            model: output
                .model
                .unwrap_or_else(|| self.adapter.model().to_string()),
            response: output.content,
            context_sha256: compute_hash(context.as_bytes()),
            logprobs_available,
            threshold: policy.threshold(),
            matches,
        })
    }

    /// Ask every question in a suite; a failing question does not stop the run
    #[instrument(skip(self, suite, context), fields(suite = %suite.name))]
    pub async fn run_suite(&self, suite: &QuestionSuite, context: &str) -> SuiteRun {
        info!(questions = suite.len(), "Starting suite");
        let mut run = SuiteRun::default();

        for (category, question) in suite.questions() {
            match self.analyze(context, question).await {
                Ok(report) => run.reports.push((category.to_string(), report)),
                Err(e) => {
                    warn!(%category, error = %format!("{:#}", e), "Question failed");
                    run.failures.push((question.to_string(), format!("{:#}", e)));
                }
            }
        }

        info!(
            completed = run.reports.len(),
            failed = run.failures.len(),
            "Suite finished"
        );
        run
    }
}
