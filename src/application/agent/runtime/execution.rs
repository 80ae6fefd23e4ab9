use super::ToolRuntime;
use crate::application::agent::directive::ToolAction;
use serde_json::Value;
use tracing::{debug, info, warn};

const TRUNCATION_MARKER: &str = "\n[observation truncated]";

/// Result of running one action; failures are folded into `observation`.
#[derive(Debug, Clone)]
pub struct ToolExecution {
    pub tool: String,
    pub success: bool,
    pub observation: String,
}

impl ToolRuntime {
    /// Calls the tool named by `action`. Transport errors, error results
    /// and timeouts all come back as observation text.
    pub async fn execute(&self, action: &ToolAction) -> ToolExecution {
        let tool = self
            .resolve(&action.tool)
            .map(|descriptor| descriptor.name.clone())
            .unwrap_or_else(|| action.tool.clone());
        let arguments = Value::Object(action.input.arguments.clone());

        debug!(tool = %tool, server = %self.server, %arguments, "Dispatching tool call");
        let call = self.bridge.invoke_tool(&self.server, &tool, arguments);
        let (success, observation) = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(result)) => (!result.is_error, result.text),
            Ok(Err(err)) => {
                warn!(tool = %tool, %err, "Tool call failed");
                (false, format!("Error calling tool '{tool}': {err}"))
            }
            Err(_) => {
                warn!(tool = %tool, timeout_secs = self.timeout.as_secs(), "Tool call timed out");
                (
                    false,
                    format!(
                        "Error calling tool '{tool}': no response within {} seconds",
                        self.timeout.as_secs()
                    ),
                )
            }
        };

        let observation = truncate_observation(observation, self.max_observation_bytes);
        info!(tool = %tool, success, bytes = observation.len(), "Tool executed");
        ToolExecution {
            tool,
            success,
            observation,
        }
    }
}

/// Cuts `text` to at most `max_bytes` on a char boundary and marks the cut.
pub fn truncate_observation(mut text: String, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str(TRUNCATION_MARKER);
    text
}
