use super::directive::InputSource;
use crate::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL_TIMEOUT_SECS};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Recorded for every tool call the agent made.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub tool: String,
    pub input: Value,
    pub input_source: InputSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_issue: Option<String>,
    pub success: bool,
    pub observation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The model produced a final answer.
    Finished,
    /// The iteration bound was hit first; `output` is partial.
    IterationLimit,
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub output: String,
    pub extracted_data: Map<String, Value>,
    pub steps: Vec<AgentStep>,
    pub iterations: usize,
    pub termination: Termination,
}

impl AgentOutcome {
    pub fn tools_used(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn iteration_limit_reached(&self) -> bool {
        self.termination == Termination::IterationLimit
    }
}

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub max_iterations: usize,
    pub model_timeout: Duration,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model_timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
        }
    }
}
