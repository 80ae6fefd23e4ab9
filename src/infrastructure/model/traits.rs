//! Model traits

use super::types::{ModelError, ModelRequest, ModelResponse};
use async_trait::async_trait;

/// What the agent loop calls to get the next turn of text.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}

/// A concrete API backend.
#[async_trait]
pub trait ModelClient: Send + Sync {
    fn id(&self) -> &str;

    fn model(&self) -> &str;

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}
