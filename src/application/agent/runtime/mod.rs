mod execution;
mod normalizer;
mod parser;
mod prompt;
mod scratchpad;

use std::sync::Arc;
use std::time::Duration;

use crate::application::tooling::{ToolDescriptor, ToolInvokeError, ToolServerInterface};
use tracing::info;

pub use execution::{ToolExecution, truncate_observation};
pub use normalizer::{
    DEFAULT_INPUT_KEY, InputIssue, NormalizedInput, RawToolInput, ToolInputSchema, normalize,
};
pub use parser::parse_output;
pub use prompt::render_prompt;
pub(crate) use scratchpad::render_turn;
pub use scratchpad::{Scratchpad, ScratchpadEntry};

/// Tool catalog and transport for one server, shared by agent runs.
pub struct ToolRuntime {
    server: String,
    catalog: Vec<ToolDescriptor>,
    bridge: Arc<dyn ToolServerInterface>,
    timeout: Duration,
    max_observation_bytes: usize,
}

impl ToolRuntime {
    pub fn new(
        server: impl Into<String>,
        catalog: Vec<ToolDescriptor>,
        bridge: Arc<dyn ToolServerInterface>,
        timeout: Duration,
        max_observation_bytes: usize,
    ) -> Self {
        Self {
            server: server.into(),
            catalog,
            bridge,
            timeout,
            max_observation_bytes,
        }
    }

    /// Fetches the catalog from `server` before the first model call.
    pub async fn load(
        server: impl Into<String>,
        bridge: Arc<dyn ToolServerInterface>,
        timeout: Duration,
        max_observation_bytes: usize,
    ) -> Result<Self, ToolInvokeError> {
        let server = server.into();
        let catalog = bridge.list_tools(&server).await?;
        info!(
            server = %server,
            tools = catalog.len(),
            "Loaded tool catalog"
        );
        Ok(Self::new(server, catalog, bridge, timeout, max_observation_bytes))
    }

    pub fn catalog(&self) -> &[ToolDescriptor] {
        &self.catalog
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Looks a tool up by name, ignoring case.
    pub fn resolve(&self, name: &str) -> Option<&ToolDescriptor> {
        self.catalog
            .iter()
            .find(|tool| tool.name.eq_ignore_ascii_case(name))
    }

    pub fn tool_names(&self) -> String {
        self.catalog
            .iter()
            .map(|tool| tool.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
