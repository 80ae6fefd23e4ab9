//! The model provider handed to the agent.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::factory::ProviderFactory;
use super::traits::{ModelClient, ModelProvider};
use super::types::{ModelError, ModelRequest, ModelResponse};
use crate::config::ModelProviderConfig;

/// Wraps whichever backend the configuration selected.
pub struct DynamicModelProvider {
    client: Box<dyn ModelClient>,
}

impl DynamicModelProvider {
    pub fn from_config(config: &ModelProviderConfig, timeout: Duration) -> Result<Self, ModelError> {
        Ok(Self {
            client: ProviderFactory::create(config, timeout)?,
        })
    }

    pub fn from_client(client: Box<dyn ModelClient>) -> Self {
        Self { client }
    }

    pub fn id(&self) -> &str {
        self.client.id()
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

#[async_trait]
impl ModelProvider for DynamicModelProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        debug!(
            provider = self.client.id(),
            model = request.model.as_deref().unwrap_or(self.client.model()),
            "Routing model request"
        );
        self.client.chat(request).await
    }
}
