//! Configuration from the environment (and `.env` via dotenv), overridable from the CLI.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use async_openai::config::OpenAIConfig;

use crate::core::api_key;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// How suggestions are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StrategyKind {
    /// Look words up in the gendered term table.
    #[default]
    Table,
    /// Ask the chat model to rewrite the text and parse its reply.
    Model,
}

/// Which semantic estimator contributes to the score, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SemanticKind {
    #[default]
    Off,
    /// In-process embedding projection onto a gender direction.
    Embedding,
    /// Ask the chat model for a 0-1 rating.
    Model,
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "model" => Ok(Self::Model),
            _ => Err(ConfigError::Invalid {
                var: "EQUALSPEAK_STRATEGY",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for SemanticKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "" => Ok(Self::Off),
            "embedding" => Ok(Self::Embedding),
            "model" => Ok(Self::Model),
            _ => Err(ConfigError::Invalid {
                var: "EQUALSPEAK_SEMANTIC",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    api_key: Option<String>,
    pub model_id: String,
    pub strategy: StrategyKind,
    pub semantic: SemanticKind,
    pub debounce: Duration,
    pub timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "EQUALSPEAK_API_KEY is not set (set it in the environment or run `equalspeak set-key`)"
    )]
    MissingApiKey,
    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model_id: DEFAULT_MODEL.to_string(),
            strategy: StrategyKind::default(),
            semantic: SemanticKind::default(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl Config {
    /// API key, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// True when the selected strategy or estimator calls the chat model.
    pub fn needs_model(&self) -> bool {
        self.strategy == StrategyKind::Model || self.semantic == SemanticKind::Model
    }

    /// Client configuration for the chat model. Errors if no API key is available.
    pub fn openai_config(&self) -> Result<OpenAIConfig, ConfigError> {
        let api_key = self.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
        Ok(OpenAIConfig::new()
            .with_api_base(self.base_url.clone())
            .with_api_key(api_key))
    }

    /// Fail early if a model-backed component is selected without a key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.needs_model() && self.api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}

fn parse_millis(var: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(var) {
        Ok(v) => v
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::Invalid { var, value: v }),
        Err(_) => Ok(Duration::from_millis(default)),
    }
}

/// Load configuration from the environment. The API key falls back to the stored key file.
pub fn load() -> Result<Config, ConfigError> {
    let base_url = env::var("EQUALSPEAK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

    let api_key = env::var("EQUALSPEAK_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .or_else(api_key::load_api_key);

    let model_id = env::var("EQUALSPEAK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    let strategy = match env::var("EQUALSPEAK_STRATEGY") {
        Ok(v) => v.parse()?,
        Err(_) => StrategyKind::default(),
    };
    let semantic = match env::var("EQUALSPEAK_SEMANTIC") {
        Ok(v) => v.parse()?,
        Err(_) => SemanticKind::default(),
    };

    Ok(Config {
        base_url,
        api_key,
        model_id,
        strategy,
        semantic,
        debounce: parse_millis("EQUALSPEAK_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?,
        timeout: parse_millis("EQUALSPEAK_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
    })
}
