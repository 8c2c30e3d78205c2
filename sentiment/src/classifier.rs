//! Per-quote classification with retry
//!
//! One quote becomes one prompt. Transport faults are retried with
//! exponential backoff up to `RetryPolicy::max_attempts` total attempts; a
//! reply that does not parse as an integer ends the quote immediately.
//! Neither outcome is an error: both surface as a `Classification` without a
//! score.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::client::{CompletionClient, CompletionError, CompletionRequest};
use crate::prompt::build_prompt;

/// Attempt budget and backoff for one quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Sleep after the first failure; doubles after each further failure
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_factor(2.0)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
    }
}

/// Outcome of classifying one quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Succeeded { score: i64, attempts: u32 },
    /// The model replied, but not with a bare integer.
    ParseFailed { raw_reply: String, attempts: u32 },
    /// Every attempt hit a transport or provider fault.
    ExhaustedRetries { attempts: u32, last_error: String },
}

impl Classification {
    pub fn score(&self) -> Option<i64> {
        match self {
            Self::Succeeded { score, .. } => Some(*score),
            _ => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. }
            | Self::ParseFailed { attempts, .. }
            | Self::ExhaustedRetries { attempts, .. } => *attempts,
        }
    }
}

/// Whitespace-trimmed signed integer, otherwise `None`. Values outside
/// -2..=2 are returned as-is.
pub fn parse_score(reply: &str) -> Option<i64> {
    reply.trim().parse::<i64>().ok()
}

pub struct SentimentClassifier<C> {
    client: C,
    model: String,
    temperature: f32,
    policy: RetryPolicy,
}

impl<C: CompletionClient> SentimentClassifier<C> {
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: 0.0,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Classify one quote. Never fails; see [`Classification`].
    pub async fn classify(&self, text: &str) -> Classification {
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: build_prompt(text),
            temperature: self.temperature,
        };
        let attempts = AtomicU32::new(0);
        let max_attempts = self.policy.max_attempts;

        let client = &self.client;
        let request_ref = &request;
        let attempts_ref = &attempts;

        let reply = (move || async move {
            let attempt = attempts_ref.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!(
                attempt,
                max_attempts,
                prompt_chars = request_ref.prompt.chars().count(),
                "API attempt"
            );
            client.complete(request_ref).await
        })
        .retry(self.policy.backoff())
        .sleep(tokio::time::sleep)
        .notify(|err: &CompletionError, delay: Duration| {
            let attempt = attempts_ref.load(Ordering::SeqCst);
            if err.is_rate_limit() {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %err,
                    retry_in = ?delay,
                    "Rate limited, backing off"
                );
            } else {
                tracing::error!(
                    attempt,
                    max_attempts,
                    error = %err,
                    retry_in = ?delay,
                    "API error, retrying"
                );
            }
        })
        .await;

        let attempts = attempts.load(Ordering::SeqCst);
        match reply {
            Ok(raw) => match parse_score(&raw) {
                Some(score) => {
                    tracing::info!(attempt = attempts, raw_reply = %raw.trim(), score, "API reply");
                    Classification::Succeeded { score, attempts }
                }
                None => {
                    tracing::error!(
                        attempt = attempts,
                        raw_reply = %raw.trim(),
                        "Could not parse integer from reply"
                    );
                    Classification::ParseFailed {
                        raw_reply: raw,
                        attempts,
                    }
                }
            },
            Err(err) => {
                tracing::error!(attempts, error = %err, "All API attempts failed");
                Classification::ExhaustedRetries {
                    attempts,
                    last_error: err.to_string(),
                }
            }
        }
    }
}
