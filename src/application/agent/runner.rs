use super::directive::{AgentDirective, ToolAction};
use super::errors::AgentError;
use super::models::{AgentOptions, AgentOutcome, AgentStep, Termination};
use super::runtime::{Scratchpad, ToolRuntime, parse_output, render_prompt, render_turn};
use crate::application::extraction::extract_json;
use crate::infrastructure::model::{ModelError, ModelProvider, ModelRequest};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Generation is cut here so the model cannot invent its own observation.
const OBSERVATION_STOP: &str = "\nObservation:";
const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit.";
const THOUGHT_MARKER: &str = "Thought:";

/// Per-run state; never shared between requests.
struct LoopState {
    iteration_count: usize,
    max_iterations: usize,
    scratchpad: Scratchpad,
    finished: bool,
    /// A rejected turn shown to the model once, outside the scratchpad.
    rejection: Option<String>,
    last_text: Option<String>,
}

impl LoopState {
    fn new(max_iterations: usize) -> Self {
        Self {
            iteration_count: 0,
            max_iterations,
            scratchpad: Scratchpad::default(),
            finished: false,
            rejection: None,
            last_text: None,
        }
    }

    fn exhausted(&self) -> bool {
        self.iteration_count >= self.max_iterations
    }

    fn transcript(&self) -> String {
        let mut text = self.scratchpad.render();
        if let Some(rejection) = &self.rejection {
            text.push_str(rejection);
        }
        text
    }

    fn reject(&mut self, log: &str, reason: String) {
        self.rejection = Some(render_turn(log, &reason));
        self.iteration_count += 1;
    }
}

pub struct Agent<P: ModelProvider> {
    provider: Arc<P>,
    runtime: Arc<ToolRuntime>,
    options: AgentOptions,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(provider: Arc<P>, runtime: Arc<ToolRuntime>, options: AgentOptions) -> Self {
        Self {
            provider,
            runtime,
            options,
        }
    }

    pub fn runtime(&self) -> &ToolRuntime {
        &self.runtime
    }

    /// Runs think/act/observe rounds until a final answer or the bound.
    pub async fn run(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentOutcome, AgentError> {
        info!(max_iterations = self.options.max_iterations, "Agent run started");
        let mut state = LoopState::new(self.options.max_iterations.max(1));
        let mut steps = Vec::new();

        while !state.exhausted() {
            if cancel.is_cancelled() {
                return Err(AgentError::Cancelled);
            }

            let text = tokio::select! {
                _ = cancel.cancelled() => return Err(AgentError::Cancelled),
                turn = self.next_turn(question, &state) => turn?,
            };
            debug!(
                iteration = state.iteration_count,
                chars = text.len(),
                "Model turn received"
            );

            match parse_output(&text) {
                Ok(AgentDirective::Final { output }) => {
                    state.finished = true;
                    info!(
                        iterations = state.iteration_count,
                        tools = state.scratchpad.len(),
                        "Agent returned final answer"
                    );
                    return Ok(finish(output, steps, &state, Termination::Finished));
                }
                Ok(AgentDirective::CallTool(mut action)) => {
                    let Some(descriptor) = self.runtime.resolve(&action.tool) else {
                        warn!(tool = %action.tool, "Model requested a tool that is not in the catalog");
                        let reason = format!(
                            "{} is not a valid tool, try one of [{}].",
                            action.tool,
                            self.runtime.tool_names()
                        );
                        state.reject(&action.log, reason);
                        state.last_text = Some(text);
                        continue;
                    };
                    action.tool = descriptor.name.clone();
                    if cancel.is_cancelled() {
                        return Err(AgentError::Cancelled);
                    }
                    steps.push(self.act(&mut state, action, cancel).await?);
                }
                Err(err) => {
                    warn!(%err, iteration = state.iteration_count, "Could not parse model output");
                    state.reject(&text, err.to_string());
                }
            }
            state.last_text = Some(text);
        }

        warn!(
            iterations = state.iteration_count,
            "Agent reached the iteration bound without a final answer"
        );
        let output = partial_answer(state.last_text.as_deref());
        Ok(finish(output, steps, &state, Termination::IterationLimit))
    }

    async fn next_turn(&self, question: &str, state: &LoopState) -> Result<String, AgentError> {
        let prompt = render_prompt(question, self.runtime.catalog(), &state.transcript());
        let request = ModelRequest::prompt(prompt).with_stop(OBSERVATION_STOP);

        let response = tokio::time::timeout(self.options.model_timeout, self.provider.chat(request))
            .await
            .map_err(|_| ModelError::timeout("model", self.options.model_timeout))??;
        Ok(response.text().to_string())
    }

    async fn act(
        &self,
        state: &mut LoopState,
        action: ToolAction,
        cancel: &CancellationToken,
    ) -> Result<AgentStep, AgentError> {
        info!(
            tool = %action.tool,
            source = ?action.source,
            iteration = state.iteration_count + 1,
            "Agent requested tool execution"
        );
        let execution = tokio::select! {
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            execution = self.runtime.execute(&action) => execution,
        };

        let step = AgentStep {
            tool: execution.tool,
            input: Value::Object(action.input.arguments.clone()),
            input_source: action.source,
            input_issue: action.input.issue.as_ref().map(ToString::to_string),
            success: execution.success,
            observation: execution.observation.clone(),
        };

        state.scratchpad.push(action, execution.observation);
        state.rejection = None;
        state.iteration_count += 1;
        Ok(step)
    }
}

fn finish(
    output: String,
    steps: Vec<AgentStep>,
    state: &LoopState,
    termination: Termination,
) -> AgentOutcome {
    let extracted_data = extract_json(&output);
    debug!(
        finished = state.finished,
        iterations = state.iteration_count,
        fields = extracted_data.len(),
        "Agent run complete"
    );
    AgentOutcome {
        output,
        extracted_data,
        steps,
        iterations: state.iteration_count,
        termination,
    }
}

/// Best-effort text from the last turn: its thought, without the action.
fn partial_answer(last_text: Option<&str>) -> String {
    let thought = last_text
        .map(|text| {
            let before_action = match text.to_ascii_lowercase().find("action:") {
                Some(index) => &text[..index],
                None => text,
            };
            strip_thought_marker(before_action.trim()).trim().to_string()
        })
        .unwrap_or_default();

    if thought.is_empty() {
        ITERATION_LIMIT_MESSAGE.to_string()
    } else {
        thought
    }
}

fn strip_thought_marker(text: &str) -> &str {
    match text.get(..THOUGHT_MARKER.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(THOUGHT_MARKER) => &text[THOUGHT_MARKER.len()..],
        _ => text,
    }
}

#[cfg(test)]
mod partial_tests {
    use super::*;

    #[test]
    fn partial_answer_keeps_thought_only() {
        let text = "Thought: the invoice total is 50\nAction: read_doc_contents\nAction Input: a.pdf";
        assert_eq!(partial_answer(Some(text)), "the invoice total is 50");
    }

    #[test]
    fn thought_marker_is_stripped_in_any_case() {
        let text = "THOUGHT: check the bill of lading\nACTION: read_doc_contents";
        assert_eq!(partial_answer(Some(text)), "check the bill of lading");
        assert_eq!(partial_answer(Some("thought:  lowercase too")), "lowercase too");
    }

    #[test]
    fn partial_answer_defaults_when_nothing_useful() {
        assert_eq!(partial_answer(None), ITERATION_LIMIT_MESSAGE);
        assert_eq!(
            partial_answer(Some("Action: list_available_pdfs\nAction Input: {}")),
            ITERATION_LIMIT_MESSAGE
        );
    }
}
