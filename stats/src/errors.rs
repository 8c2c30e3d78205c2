//! Survey statistics error types
//!
//! Every variant is fatal for the statistic (or the whole report) that raised
//! it. Nothing here is retried or silently substituted.

use std::path::PathBuf;

use thiserror::Error;

/// Error category for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Required columns or cell values are missing/malformed
    InputValidationError,
    /// A statistic cannot be computed (e.g. zero total weight)
    ComputationError,
    /// Reading the CSV or writing the report failed
    IoError,
    /// Template rendering failed
    RenderError,
}

impl ErrorCategory {
    /// Machine-readable code for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputValidationError => "INPUT_VALIDATION_ERROR",
            Self::ComputationError => "COMPUTATION_ERROR",
            Self::IoError => "IO_ERROR",
            Self::RenderError => "RENDER_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("division by zero: weights of {valid_count} valid observations sum to zero")]
    DivisionByZero { valid_count: usize },

    #[error("length mismatch: {values} values but {weights} weights")]
    LengthMismatch { values: usize, weights: usize },

    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("invalid value '{value}' in column '{column}' at line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },

    #[error("failed to parse survey CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{variable}: {source}")]
    Variable {
        variable: &'static str,
        #[source]
        source: Box<StatsError>,
    },

    #[error("failed to render README template: {0}")]
    Render(#[from] askama::Error),
}

impl StatsError {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DivisionByZero { .. } | Self::LengthMismatch { .. } => {
                ErrorCategory::ComputationError
            }
            Self::MissingColumn { .. } | Self::InvalidValue { .. } | Self::Csv(_) => {
                ErrorCategory::InputValidationError
            }
            Self::Io { .. } => ErrorCategory::IoError,
            Self::Variable { source, .. } => source.category(),
            Self::Render(_) => ErrorCategory::RenderError,
        }
    }

    /// Attach the name of the variable whose statistic failed
    pub fn for_variable(self, variable: &'static str) -> Self {
        Self::Variable {
            variable,
            source: Box::new(self),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for survey statistics operations
pub type Result<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn variable_wrapper_keeps_inner_category() {
        let err = StatsError::DivisionByZero { valid_count: 4 }.for_variable("age");
        assert_eq!(err.category(), ErrorCategory::ComputationError);
        assert_eq!(
            err.to_string(),
            "age: division by zero: weights of 4 valid observations sum to zero"
        );
    }

    #[test]
    fn input_errors_are_validation_category() {
        let err = StatsError::MissingColumn {
            column: "Q49".to_string(),
        };
        assert_eq!(err.category().as_str(), "INPUT_VALIDATION_ERROR");
    }
}
