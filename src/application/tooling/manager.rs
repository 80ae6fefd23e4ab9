use super::error::ToolInvokeError;
use super::interface::{ToolCallResult, ToolDescriptor, ToolServerInterface};
use super::process::McpProcess;
use crate::config::ServerConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Lazily spawns and caches one process per configured tool server.
pub struct ServerManager {
    configs: HashMap<String, ServerConfig>,
    instances: Mutex<HashMap<String, McpProcess>>,
}

impl ServerManager {
    pub fn new(configs: Vec<ServerConfig>) -> Self {
        let configs = configs
            .into_iter()
            .map(|cfg| (cfg.name.clone(), cfg))
            .collect();
        Self {
            configs,
            instances: Mutex::new(HashMap::new()),
        }
    }

    async fn ensure_process(&self, server: &str) -> Result<McpProcess, ToolInvokeError> {
        let process = {
            let mut instances = self.instances.lock().await;
            match instances.get(server) {
                Some(existing) => existing.clone(),
                None => {
                    let config = self.configs.get(server).cloned().ok_or_else(|| {
                        ToolInvokeError::NotConfigured {
                            server: server.to_string(),
                        }
                    })?;
                    let process = McpProcess::new(config);
                    instances.insert(server.to_string(), process.clone());
                    process
                }
            }
        };

        process.ensure_running().await?;
        Ok(process)
    }

    /// Round-trips a `ping` to check the server is responsive.
    pub async fn ping(&self, server: &str) -> Result<(), ToolInvokeError> {
        let process = self.ensure_process(server).await?;
        process.ping().await?;
        debug!(server, "Tool server answered ping");
        Ok(())
    }

    /// Stops every running tool server process.
    pub async fn shutdown(&self) {
        let instances: Vec<(String, McpProcess)> = self.instances.lock().await.drain().collect();
        for (name, process) in instances {
            info!(server = %name, "Stopping tool server");
            process.shutdown().await;
        }
    }
}

#[async_trait]
impl ToolServerInterface for ServerManager {
    async fn list_tools(&self, server: &str) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        let process = self.ensure_process(server).await?;
        process.tools().await
    }

    async fn invoke_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<ToolCallResult, ToolInvokeError> {
        let process = self.ensure_process(server).await?;
        process.call_tool(tool, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_server_is_not_configured() {
        let manager = ServerManager::new(Vec::new());
        let err = manager
            .list_tools("pdf-extractor")
            .await
            .expect_err("no servers configured");
        assert!(matches!(err, ToolInvokeError::NotConfigured { server } if server == "pdf-extractor"));
    }
}
