//! Sentiment pipeline error types
//!
//! Only run-level failures live here: they abort the whole batch. Row-level
//! failures (transport faults, unparseable replies) never become a
//! `SentimentError`; they end up as an absent score in the results.

use thiserror::Error;

/// Error category for structured logging and behavior mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing credential, unreadable or invalid config
    ConfigError,
    /// Input CSV missing or lacking required columns
    InputValidationError,
    /// Results could not be written
    OutputError,
}

impl ErrorCategory {
    /// Machine-readable code for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::InputValidationError => "INPUT_VALIDATION_ERROR",
            Self::OutputError => "OUTPUT_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("input error: {message}")]
    Input {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("output error: {message}")]
    Output {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SentimentError {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config { .. } => ErrorCategory::ConfigError,
            Self::Input { .. } => ErrorCategory::InputValidationError,
            Self::Output { .. } => ErrorCategory::OutputError,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            source: None,
        }
    }

    pub fn input_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Input {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn output_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Output {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for sentiment pipeline operations
pub type Result<T> = std::result::Result<T, SentimentError>;
