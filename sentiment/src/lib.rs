//! Manager-quote sentiment scoring
//!
//! Each quote is sent to a chat-completions model with a fixed rating prompt
//! and scored on a -2..=2 scale. Transport faults are retried with exponential
//! backoff; quotes that still cannot be scored keep an empty score so the
//! results stay row-aligned with the input.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod batch;
pub mod classifier;
pub mod client;
pub mod config;
pub mod errors;
pub mod prompt;
pub mod records;
pub mod throttle;

pub use batch::{BatchReport, BatchRunner, ClassificationRecord, ScoreDistribution, TextRecord};
pub use classifier::{Classification, RetryPolicy, SentimentClassifier, parse_score};
pub use client::{CompletionClient, CompletionError, CompletionRequest, OpenAiClient};
pub use config::{ColumnNames, SentimentConfig, api_key_from_env};
pub use errors::{ErrorCategory, Result, SentimentError};
pub use records::{load_records, read_records, write_results};
pub use throttle::ThrottledClient;
