//! Provider factory - creates clients from config

use super::clients::{GeminiClient, OllamaClient};
use super::traits::ModelClient;
use super::types::ModelError;
use crate::config::{ModelProviderConfig, ProviderKind};
use std::time::Duration;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates the client matching `config.kind`.
    pub fn create(
        config: &ModelProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn ModelClient>, ModelError> {
        Ok(match config.kind {
            ProviderKind::Gemini => Box::new(GeminiClient::from_config(config, timeout)?),
            ProviderKind::Ollama => Box::new(OllamaClient::from_config(config, timeout)?),
        })
    }
}
