//! Sentiment pipeline configuration
//!
//! Defaults < optional TOML file < `FIELDWORK_*` environment overrides. CLI
//! flags are applied on top by the binary. The API key is never read from the
//! file, only from `OPENAI_API_KEY`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::classifier::RetryPolicy;
use crate::errors::{Result, SentimentError};

/// Root configuration for the classify pipeline
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SentimentConfig {
    /// Chat model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// OpenAI-compatible API root (without `/chat/completions`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Decoding temperature; 0 keeps repeated runs comparable
    #[serde(default)]
    pub temperature: f32,

    /// Request attempts per quote, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Sleep before the second attempt; doubles after each failure
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Quotes classified concurrently (1 = sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Upper bound on request starts per minute across all workers
    #[serde(default)]
    pub requests_per_minute: Option<u32>,

    #[serde(default)]
    pub columns: ColumnNames,
}

/// Column names in the quotes CSV
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    #[serde(default = "default_id_column")]
    pub id: String,
    #[serde(default = "default_text_column")]
    pub text: String,
}

fn default_model() -> String {
    "gpt-4.1-2025-04-14".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_concurrency() -> usize {
    1
}

fn default_id_column() -> String {
    "text_id".to_string()
}

fn default_text_column() -> String {
    "processed_tex".to_string()
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: default_id_column(),
            text: default_text_column(),
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            temperature: 0.0,
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            concurrency: default_concurrency(),
            requests_per_minute: None,
            columns: ColumnNames::default(),
        }
    }
}

impl SentimentConfig {
    /// Environment variable holding the provider credential
    pub const ENV_API_KEY: &'static str = "OPENAI_API_KEY";
    pub const ENV_MODEL: &'static str = "FIELDWORK_MODEL";
    pub const ENV_BASE_URL: &'static str = "FIELDWORK_BASE_URL";

    /// Load from `path` (or defaults when `None`) and apply env overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SentimentError::config_with_source(
                format!("failed to read config at {}", path.display()),
                e,
            )
        })?;
        let cfg = Self::parse(&contents)?;
        tracing::info!(path = %path.display(), "Loaded sentiment config");
        Ok(cfg)
    }

    /// Parse configuration from TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: SentimentConfig = toml::from_str(contents)
            .map_err(|e| SentimentError::config_with_source("failed to parse config", e))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `FIELDWORK_*` overrides using `lookup` to read variables
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup(Self::ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.model = model;
        }
        if let Some(base_url) = lookup(Self::ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(SentimentError::config("max_attempts must be at least 1"));
        }
        if self.concurrency == 0 {
            return Err(SentimentError::config("concurrency must be at least 1"));
        }
        if self.requests_per_minute == Some(0) {
            return Err(SentimentError::config(
                "requests_per_minute must be at least 1 when set",
            ));
        }
        if self.model.trim().is_empty() {
            return Err(SentimentError::config("model must not be empty"));
        }
        if self.temperature != 0.0 {
            tracing::warn!(
                temperature = self.temperature,
                "Non-zero temperature, repeated runs may disagree"
            );
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Minimum spacing between request starts implied by `requests_per_minute`
    pub fn min_request_interval(&self) -> Option<Duration> {
        self.requests_per_minute
            .map(|rpm| Duration::from_secs(60) / rpm.max(1))
    }
}

/// Read the provider API key; absence is fatal for the run
pub fn api_key_from_env() -> Result<String> {
    api_key_from(|key| std::env::var(key).ok())
}

fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    lookup(SentimentConfig::ENV_API_KEY)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            SentimentError::config(format!(
                "{} not set in environment",
                SentimentConfig::ENV_API_KEY
            ))
        })
}
