//! Model types - Request, Response, and Error types

use crate::domain::types::{ChatMessage, MessageRole};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Sampling settings sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_output_tokens: 2000,
            top_p: 0.95,
        }
    }
}

/// Model request for one completion turn
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub messages: Vec<ChatMessage>,
    /// Overrides the provider's configured model.
    pub model: Option<String>,
    /// Generation stops before any of these sequences.
    pub stop: Vec<String>,
}

impl ModelRequest {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(text)],
            model: None,
            stop: Vec::new(),
        }
    }

    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop.push(stop.into());
        self
    }
}

/// Model response from LLM
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: ChatMessage,
}

impl ModelResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            message: ChatMessage::new(MessageRole::Assistant, content),
        }
    }

    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
    #[error("provider '{provider}' did not answer within {timeout:?}")]
    Timeout { provider: String, timeout: Duration },
}

impl ModelError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            provider: provider.into(),
            timeout,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::Network { source, .. } => {
                source.is_connect()
                    || source.is_timeout()
                    || source.status().is_some_and(|status| {
                        status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
                    })
            }
            ModelError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Short explanation suitable for an end user.
    pub fn user_message(&self) -> String {
        match self {
            ModelError::MissingApiKey { provider } => {
                format!("The '{provider}' model provider needs an API key.")
            }
            ModelError::Network { provider, source } => {
                if source.is_connect() {
                    format!("Could not connect to model provider '{provider}'.")
                } else if source.is_timeout() {
                    format!("The request to '{provider}' timed out.")
                } else if let Some(status) = source.status() {
                    match status {
                        StatusCode::NOT_FOUND => format!("Endpoint for '{provider}' was not found."),
                        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                            format!("Model provider '{provider}' is unavailable.")
                        }
                        _ => format!("Request to '{provider}' failed: {}", status.as_u16()),
                    }
                } else {
                    format!("Network error talking to '{provider}'.")
                }
            }
            ModelError::InvalidResponse { provider, .. } => {
                format!("The response from '{provider}' could not be understood.")
            }
            ModelError::Timeout { provider, .. } => {
                format!("Model provider '{provider}' took too long to answer.")
            }
        }
    }
}
