//! # Provider Configuration
//!
//! | Kind | Description | API Key Required |
//! |------|-------------|-----------------|
//! | `gemini` | Google Gemini `generateContent` | Yes |
//! | `ollama` | Local Ollama server | No |

use crate::constants::{
    DEFAULT_GEMINI_API_PATH, DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL,
    DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL,
};
use serde::Deserialize;

/// Which model API the agent talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Ollama,
}

impl ProviderKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_ENDPOINT,
            Self::Ollama => DEFAULT_OLLAMA_ENDPOINT,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_MODEL,
            Self::Ollama => DEFAULT_OLLAMA_MODEL,
        }
    }
}

/// Resolved settings for the model provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelProviderConfig {
    pub kind: ProviderKind,
    pub endpoint: String,
    pub api_path: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub max_retries: u32,
}

impl ModelProviderConfig {
    pub fn requires_api_key(&self) -> bool {
        self.kind == ProviderKind::Gemini
    }
}

/// `[model]` table as written in the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct RawProviderConfig {
    pub(super) provider: Option<String>,
    pub(super) endpoint: Option<String>,
    pub(super) api_path: Option<String>,
    pub(super) model: Option<String>,
    pub(super) api_key: Option<String>,
    pub(super) temperature: Option<f32>,
    pub(super) max_output_tokens: Option<u32>,
    pub(super) top_p: Option<f32>,
    pub(super) max_retries: Option<u32>,
}

impl ModelProviderConfig {
    pub(super) fn from_raw(kind: ProviderKind, raw: RawProviderConfig) -> Self {
        Self {
            kind,
            endpoint: raw
                .endpoint
                .unwrap_or_else(|| kind.default_endpoint().to_string()),
            api_path: raw
                .api_path
                .unwrap_or_else(|| DEFAULT_GEMINI_API_PATH.to_string()),
            model: raw.model.unwrap_or_else(|| kind.default_model().to_string()),
            api_key: raw.api_key.filter(|key| !key.trim().is_empty()),
            temperature: raw.temperature.unwrap_or(0.0),
            max_output_tokens: raw.max_output_tokens.unwrap_or(2000),
            top_p: raw.top_p.unwrap_or(0.95),
            max_retries: raw.max_retries.unwrap_or(2),
        }
    }
}
