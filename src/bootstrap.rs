//! Builds the object graph once at startup.

use crate::application::agent::{Agent, AgentOptions, ToolRuntime};
use crate::application::service::ExtractionService;
use crate::application::tooling::{ServerManager, ToolInvokeError, ToolServerInterface};
use crate::config::AppConfig;
use crate::infrastructure::a2a::{A2aExecutor, ServerState, TaskStore};
use crate::infrastructure::model::{DynamicModelProvider, ModelError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("model provider setup failed: {0}")]
    Model(#[from] ModelError),
    #[error("tool server setup failed: {0}")]
    Tools(#[from] ToolInvokeError),
}

pub struct AppContext {
    config: AppConfig,
    tools: Arc<ServerManager>,
    service: Arc<ExtractionService<DynamicModelProvider>>,
    executor: Arc<A2aExecutor<DynamicModelProvider>>,
}

impl AppContext {
    /// Starts the PDF tool server, loads its catalog and wires the agent.
    pub async fn build(config: AppConfig) -> Result<Self, BootstrapError> {
        let tools = Arc::new(ServerManager::new(vec![config.pdf_server.clone()]));
        let bridge: Arc<dyn ToolServerInterface> = tools.clone();

        let runtime = ToolRuntime::load(
            config.pdf_server.name.clone(),
            bridge,
            config.agent.tool_timeout,
            config.max_observation_bytes(),
        )
        .await?;

        let provider = DynamicModelProvider::from_config(&config.provider, config.agent.model_timeout)?;
        info!(
            provider = provider.id(),
            model = provider.model(),
            tools = runtime.catalog().len(),
            "Agent wired"
        );

        let options = AgentOptions {
            max_iterations: config.agent.max_iterations,
            model_timeout: config.agent.model_timeout,
        };
        let agent = Agent::new(Arc::new(provider), Arc::new(runtime), options);
        let service = Arc::new(ExtractionService::new(agent, config.documents.clone()));
        let executor = Arc::new(A2aExecutor::new(service.clone(), Arc::new(TaskStore::new())));

        Ok(Self {
            config,
            tools,
            service,
            executor,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn service(&self) -> Arc<ExtractionService<DynamicModelProvider>> {
        Arc::clone(&self.service)
    }

    pub fn server_state(&self) -> Arc<ServerState<DynamicModelProvider>> {
        Arc::new(ServerState::new(
            Arc::clone(&self.executor),
            self.config.a2a.public_url(),
        ))
    }

    /// Stops the tool server processes.
    pub async fn shutdown(&self) {
        self.tools.shutdown().await;
        info!("Tool servers stopped");
    }
}
