//! Text-completion client
//!
//! `CompletionClient` is the only seam between the classifier and the
//! outside world: one prompt in, one text reply out. `OpenAiClient` talks to
//! an OpenAI-compatible `/chat/completions` endpoint; tests substitute
//! scripted fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Errors from one completion request. All of them are treated as transient
/// by the classifier.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network request failed (connect, timeout, TLS).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error ({status}): {message}")]
    ApiResponse {
        status: u16,
        message: String,
        error_type: Option<String>,
    },

    /// Response body was not the expected JSON shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Response contained no choices or no message content.
    #[error("Completion reply was empty")]
    EmptyReply,

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CompletionError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::ApiResponse { status: 429, .. })
    }
}

/// One completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Produces a single text reply for a prompt
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ProviderError,
}

/// Client for OpenAI-compatible chat-completions APIs
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    /// Build a client with its own HTTP connection pool and request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fieldwork/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Creates a client with a custom HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn headers(&self) -> Result<HeaderMap, CompletionError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| CompletionError::InvalidConfig("invalid API key".to_string()))?,
        );
        Ok(headers)
    }

    fn build_request_body(request: &CompletionRequest) -> Value {
        json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": request.temperature,
        })
    }

    fn parse_reply(body: &str) -> Result<String, CompletionError> {
        let parsed: ChatResponse = serde_json::from_str(body)
            .map_err(|e| CompletionError::Parse(format!("invalid completion response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyReply)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(self.endpoint())
            .headers(self.headers()?)
            .json(&Self::build_request_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(CompletionError::ApiResponse {
                    status: status.as_u16(),
                    message: error_response.error.message,
                    error_type: error_response.error.error_type,
                });
            }
            return Err(CompletionError::ApiResponse {
                status: status.as_u16(),
                message: body,
                error_type: None,
            });
        }

        Self::parse_reply(&body)
    }
}
