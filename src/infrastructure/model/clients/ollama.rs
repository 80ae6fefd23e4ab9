//! Ollama client implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ModelProviderConfig;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::ModelClient;
use crate::infrastructure::model::types::{
    GenerationOptions, ModelError, ModelRequest, ModelResponse,
};

/// Ollama client for local LLM
#[derive(Clone)]
pub struct OllamaClient {
    base: HttpClientBase,
    model: String,
    options: GenerationOptions,
}

impl OllamaClient {
    pub fn from_config(config: &ModelProviderConfig, timeout: Duration) -> Result<Self, ModelError> {
        Ok(Self {
            base: HttpClientBase::new(
                "ollama",
                config.endpoint.clone(),
                None,
                timeout,
                config.max_retries,
            )?,
            model: config.model.clone(),
            options: GenerationOptions {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
                top_p: config.top_p,
            },
        })
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url("/api/chat");
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());

        let payload = OllamaRequest {
            model,
            messages: MessageAdapter::to_ollama_format(&request.messages),
            stream: false,
            options: OllamaOptions {
                temperature: self.options.temperature,
                num_predict: self.options.max_output_tokens,
                top_p: self.options.top_p,
                stop: request.stop.clone(),
            },
        };

        info!(
            provider = self.base.id.as_str(),
            model = payload.model.as_str(),
            messages = request.messages.len(),
            "Sending request to Ollama"
        );

        let response: OllamaResponse = self.base.post_no_auth(&url, &payload).await?;
        debug!("Received response from Ollama");

        let content = response
            .message
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing message"))?
            .content;

        Ok(ModelResponse::new(content))
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
    top_p: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: Option<OllamaMessage>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}
