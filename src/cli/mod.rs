//! Command-line interface for groundcheck.
//!
//! Provides commands for asking grounded questions about a dataset, running
//! question suites, scoring saved responses offline, and showing the resolved
//! configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::{self, ResolvedConfig};
use crate::core::{Analyzer, GroundingScorer, QuestionSuite};
use crate::domain::{AnalysisReport, MatchReport, Token};
use crate::evidence::Attribution;

/// groundcheck - token log-probability grounding for LLM answers
#[derive(Parser, Debug)]
#[command(name = "groundcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Env file to load instead of searching for .env
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides shared by scoring commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ScoringArgs {
    /// Regex locating identifiers in the answer (default: UUID)
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Confidence threshold for a grounded verdict
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// How tokens shared by adjacent matches are attributed
    #[arg(long)]
    pub attribution: Option<Attribution>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask one question about a dataset and ground the identifiers in the answer
    Analyze {
        /// Question to ask
        #[arg(short, long)]
        question: String,

        /// Data file sent as context
        #[arg(short, long, default_value = "data.csv")]
        data: PathBuf,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// Run a question suite against a dataset
    Suite {
        /// Data file sent as context
        #[arg(short, long, default_value = "data.csv")]
        data: PathBuf,

        /// Suite YAML file (built-in suite if not provided)
        #[arg(short, long)]
        suite: Option<PathBuf>,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// Score a saved response against its token stream (no model call)
    Score {
        /// File holding the response text
        #[arg(long)]
        text: PathBuf,

        /// JSON array of {token, logprob} objects
        #[arg(long)]
        tokens: PathBuf,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        // Must run before the first config() call
        match self.env_file {
            Some(ref path) => {
                config::load_dotenv_from(path)?;
                debug!(path = %path.display(), "Loaded env file");
            }
            None => {
                if let Some(path) = config::load_dotenv()? {
                    debug!(path = %path.display(), "Loaded .env");
                }
            }
        }

        match self.command {
            Commands::Analyze {
                question,
                data,
                scoring,
            } => analyze(&question, &data, &scoring).await,
            Commands::Suite {
                data,
                suite,
                scoring,
            } => run_suite(&data, suite.as_deref(), &scoring).await,
            Commands::Score {
                text,
                tokens,
                scoring,
            } => score(&text, &tokens, &scoring),
            Commands::Config => show_config(),
        }
    }
}

/// Apply command-line overrides to the resolved configuration
fn apply_overrides(base: &ResolvedConfig, args: &ScoringArgs) -> ResolvedConfig {
    let mut config = base.clone();
    if let Some(ref pattern) = args.pattern {
        config.grounding.pattern = pattern.clone();
    }
    if let Some(threshold) = args.threshold {
        config.grounding.threshold = threshold;
    }
    if let Some(attribution) = args.attribution {
        config.grounding.attribution = attribution;
    }
    config
}

fn read_data(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))
}

/// Ask a single question
async fn analyze(question: &str, data: &Path, args: &ScoringArgs) -> Result<()> {
    let config = apply_overrides(config::config()?, args);
    let context = read_data(data)?;
    let analyzer = Analyzer::from_config(&config)?;

    let report = analyzer.analyze(&context, question).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Run every question in a suite
async fn run_suite(data: &Path, suite_path: Option<&Path>, args: &ScoringArgs) -> Result<()> {
    let config = apply_overrides(config::config()?, args);
    let context = read_data(data)?;

    let suite = match suite_path {
        Some(path) => QuestionSuite::from_file(path)?,
        None => QuestionSuite::builtin(),
    };
    suite.validate()?;

    let analyzer = Analyzer::from_config(&config)?;
    let run = analyzer.run_suite(&suite, &context).await;
    let scorer = analyzer.scorer();

    if args.json {
        let reports: Vec<_> = run
            .reports
            .iter()
            .map(|(category, report)| serde_json::json!({ "category": category, "report": report }))
            .collect();
        let failures: Vec<_> = run
            .failures
            .iter()
            .map(|(question, error)| serde_json::json!({ "question": question, "error": error }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "suite": suite.name,
                "reports": reports,
                "failures": failures,
            }))?
        );
    } else {
        println!(
            "# Suite: {} (threshold {}, attribution {})\n",
            suite.name,
            scorer.policy().threshold(),
            scorer.attribution().as_str()
        );
        let mut current_category = "";
        for (category, report) in &run.reports {
            if category != current_category {
                println!("## {}\n", category);
                current_category = category.as_str();
            }
            print_report(report);
        }
        for (question, error) in &run.failures {
            eprintln!("[Failed: {}]\n  {}", question, error);
        }
    }

    if !run.failures.is_empty() && run.reports.is_empty() {
        anyhow::bail!("All {} questions failed", run.failures.len());
    }

    Ok(())
}

/// Score a saved response offline
fn score(text_path: &Path, tokens_path: &Path, args: &ScoringArgs) -> Result<()> {
    let config = apply_overrides(config::config()?, args);

    let response = std::fs::read_to_string(text_path)
        .with_context(|| format!("Failed to read response file: {}", text_path.display()))?;
    let raw = std::fs::read_to_string(tokens_path)
        .with_context(|| format!("Failed to read tokens file: {}", tokens_path.display()))?;
    let tokens: Vec<Token> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse tokens file: {}", tokens_path.display()))?;

    let scorer = GroundingScorer::from_config(&config)?;
    let matches = scorer.score(&response, Some(&tokens));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else if matches.is_empty() {
        println!("No scored matches");
    } else {
        println!("Attribution: {}\n", scorer.attribution().as_str());
        print_matches(&matches, scorer.policy().threshold());
    }

    Ok(())
}

/// Print the resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    match config.config_file {
        Some(ref path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!();
    println!("Client:");
    println!("  base_url:        {}", config.client.base_url);
    println!("  model:           {}", config.client.model);
    println!("  api_key_env:     {}", config.client.api_key_env);
    println!("  temperature:     {}", config.client.temperature);
    println!("  top_logprobs:    {}", config.client.top_logprobs);
    println!("  timeout_seconds: {}", config.client.timeout_seconds);
    println!();
    println!("Grounding:");
    println!("  threshold:         {}", config.grounding.threshold);
    println!("  pattern:           {}", config.grounding.pattern);
    println!("  case_insensitive:  {}", config.grounding.case_insensitive);
    println!("  attribution:       {}", config.grounding.attribution.as_str());
    println!("  max_context_bytes: {}", config.grounding.max_context_bytes);

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!("Question:\n{}\n", report.question);
    println!("Response ({}):\n{}\n", report.model, report.response);

    if !report.logprobs_available {
        println!("No logprobs returned; confidence not computed");
    } else if report.matches.is_empty() {
        println!("No identifiers found in response");
    } else {
        print_matches(&report.matches, report.threshold);
    }

    println!("{}\n", "=".repeat(100));
}

fn print_matches(matches: &[MatchReport], threshold: f64) {
    println!("{:<40} {:>10} {:<10}", "MATCH", "CONFIDENCE", "VERDICT");
    println!("{}", "-".repeat(62));
    for m in matches {
        println!("{:<40} {:>10.4} {:<10}", m.text, m.confidence, m.verdict.as_str());
    }
    println!("(threshold {})\n", threshold);
}
