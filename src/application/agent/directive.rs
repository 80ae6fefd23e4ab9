use super::runtime::NormalizedInput;
use thiserror::Error;

/// What one model turn asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentDirective {
    Final { output: String },
    CallTool(ToolAction),
}

/// Where the action input was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// A brace-delimited object that decoded as JSON.
    Json,
    /// The rest of the `Action Input:` line, taken as text.
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolAction {
    pub tool: String,
    pub input: NormalizedInput,
    pub source: InputSource,
    /// The model text that produced this action.
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid Format: Missing 'Action:' after 'Thought:'")]
    MissingAction,
    #[error("Invalid Format: Missing 'Action Input:' after 'Action: {tool}'")]
    MissingActionInput { tool: String },
}
