//! Gemini client implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::config::ModelProviderConfig;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::ModelClient;
use crate::infrastructure::model::types::{
    GenerationOptions, ModelError, ModelRequest, ModelResponse,
};

/// Gemini `generateContent` client
#[derive(Clone)]
pub struct GeminiClient {
    base: HttpClientBase,
    api_path: String,
    model: String,
    options: GenerationOptions,
}

impl GeminiClient {
    pub fn from_config(config: &ModelProviderConfig, timeout: Duration) -> Result<Self, ModelError> {
        Ok(Self {
            base: HttpClientBase::new(
                "gemini",
                config.endpoint.clone(),
                config.api_key.clone(),
                timeout,
                config.max_retries,
            )?,
            api_path: config.api_path.trim_matches('/').to_string(),
            model: config.model.clone(),
            options: GenerationOptions {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
                top_p: config.top_p,
            },
        })
    }

    fn build_model_url(&self, model: &str) -> String {
        self.base
            .build_url(&format!("{}/{model}:generateContent", self.api_path))
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let url = self.build_model_url(model);
        let (system_text, contents) = MessageAdapter::to_gemini_format(&request.messages);

        let payload = GeminiRequest {
            contents,
            system_instruction: system_text.map(|text| GeminiSystem {
                parts: vec![GeminiTextPart { text }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: self.options.temperature,
                max_output_tokens: self.options.max_output_tokens,
                top_p: self.options.top_p,
                stop_sequences: request.stop.clone(),
            },
        };

        info!(
            provider = self.base.id.as_str(),
            model,
            messages = request.messages.len(),
            "Sending request to Gemini"
        );

        let response: GeminiResponse = self.base.post_with_query_key(&url, &payload).await?;
        debug!("Received response from Gemini");

        let content = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .flat_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>();
        if content.is_empty() {
            return Err(ModelError::invalid_response(&self.base.id, "missing text"));
        }

        Ok(ModelResponse::new(content.concat()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Value>,
    #[serde(rename = "system_instruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystem>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiSystem {
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generation_config_uses_gemini_field_names() {
        let payload = GeminiRequest {
            contents: vec![json!({"role": "user", "parts": [{"text": "hi"}]})],
            system_instruction: None,
            generation_config: GeminiGenerationConfig {
                temperature: 0.0,
                max_output_tokens: 2000,
                top_p: 0.95,
                stop_sequences: vec!["\nObservation:".into()],
            },
        };
        let value = serde_json::to_value(&payload).expect("serializes");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2000);
        assert_eq!(value["generationConfig"]["stopSequences"][0], "\nObservation:");
        assert!(value.get("system_instruction").is_none());
    }
}
