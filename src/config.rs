//! Configuration for groundcheck.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GROUNDCHECK_BASE_URL, GROUNDCHECK_MODEL, CONFIDENCE_THRESHOLD)
//! 2. Config file (.groundcheck/config.yaml, else <user config dir>/groundcheck/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .groundcheck/config.yaml
//! - Falls back to the per-user config directory
//!
//! A `.env` file is loaded into the process environment before anything else
//! reads it, so its variables act as environment overrides. Variables already
//! set in the shell win over the file.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::UUID_PATTERN;
use crate::evidence::Attribution;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub grounding: GroundingConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    /// Name of the env var holding the API key
    pub api_key_env: Option<String>,
    pub temperature: Option<f64>,
    pub top_logprobs: Option<u8>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingConfig {
    pub threshold: Option<f64>,
    pub pattern: Option<String>,
    pub case_insensitive: Option<bool>,
    pub attribution: Option<Attribution>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitsConfig {
    pub max_context_bytes: Option<usize>,
}

/// Resolved chat client settings
#[derive(Debug, Clone, Serialize)]
pub struct ClientSettings {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f64,
    pub top_logprobs: u8,
    pub timeout_seconds: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            temperature: 0.8,
            top_logprobs: 5,
            timeout_seconds: 120,
        }
    }
}

/// Resolved grounding settings
#[derive(Debug, Clone, Serialize)]
pub struct GroundingSettings {
    pub threshold: f64,
    pub pattern: String,
    pub case_insensitive: bool,
    pub attribution: Attribution,
    pub max_context_bytes: usize,
}

impl Default for GroundingSettings {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            pattern: UUID_PATTERN.to_string(),
            case_insensitive: true,
            attribution: Attribution::default(),
            max_context_bytes: 1_048_576, // 1MB
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedConfig {
    pub client: ClientSettings,
    pub grounding: GroundingSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".groundcheck").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    let user_config = dirs::config_dir()?.join("groundcheck").join("config.yaml");
    user_config.exists().then_some(user_config)
}

/// Load `.env` from the current directory or its parents.
///
/// Returns the path loaded, or `None` when there is no `.env` file.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e).context("Failed to load .env file"),
    }
}

/// Load an explicit env file
pub fn load_dotenv_from(path: &Path) -> Result<()> {
    dotenvy::from_path(path)
        .with_context(|| format!("Failed to load env file: {}", path.display()))
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge a parsed file and environment lookups over the defaults
fn resolve<F>(file: ConfigFile, config_file: Option<PathBuf>, env: F) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let client_defaults = ClientSettings::default();
    let grounding_defaults = GroundingSettings::default();

    let client = ClientSettings {
        base_url: env("GROUNDCHECK_BASE_URL")
            .or(file.client.base_url)
            .unwrap_or(client_defaults.base_url),
        model: env("GROUNDCHECK_MODEL")
            .or(file.client.model)
            .unwrap_or(client_defaults.model),
        api_key_env: file.client.api_key_env.unwrap_or(client_defaults.api_key_env),
        temperature: file.client.temperature.unwrap_or(client_defaults.temperature),
        top_logprobs: file.client.top_logprobs.unwrap_or(client_defaults.top_logprobs),
        timeout_seconds: file
            .client
            .timeout_seconds
            .unwrap_or(client_defaults.timeout_seconds),
    };

    let threshold = match env("CONFIDENCE_THRESHOLD") {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("CONFIDENCE_THRESHOLD is not a number: {}", raw))?,
        None => file.grounding.threshold.unwrap_or(grounding_defaults.threshold),
    };

    let grounding = GroundingSettings {
        threshold,
        pattern: file.grounding.pattern.unwrap_or(grounding_defaults.pattern),
        case_insensitive: file
            .grounding
            .case_insensitive
            .unwrap_or(grounding_defaults.case_insensitive),
        attribution: file
            .grounding
            .attribution
            .unwrap_or(grounding_defaults.attribution),
        max_context_bytes: file
            .limits
            .max_context_bytes
            .unwrap_or(grounding_defaults.max_context_bytes),
    };

    Ok(ResolvedConfig {
        client,
        grounding,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();

    let file = match config_file {
        Some(ref path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    resolve(file, config_file, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
