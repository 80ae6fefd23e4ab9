//! ReAct output parsing.
//!
//! Markers are matched case-insensitively. The last `Final Answer:` wins;
//! the first `Action:` is used.

use super::normalizer::{RawToolInput, normalize};
use crate::application::agent::directive::{AgentDirective, InputSource, ParseError, ToolAction};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

static FINAL_ANSWER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)final answer:").expect("valid final answer regex"));
static ACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)action:\s*(\w+)").expect("valid action regex"));
static ACTION_INPUT_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\Aaction input:\s*(\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\})")
        .expect("valid action input regex")
});
static ACTION_INPUT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)action input:[ \t]*([^\r\n]*)").expect("valid action input regex")
});

pub fn parse_output(text: &str) -> Result<AgentDirective, ParseError> {
    if let Some(marker) = FINAL_ANSWER.find_iter(text).last() {
        return Ok(AgentDirective::Final {
            output: text[marker.end()..].trim().to_string(),
        });
    }

    let name = ACTION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or(ParseError::MissingAction)?;
    let tool = name.as_str().to_string();

    // Only the input belonging to the first action counts.
    let after_action = &text[name.end()..];
    let input_text = ACTION_INPUT_LINE
        .find(after_action)
        .map(|marker| &after_action[marker.start()..])
        .ok_or_else(|| ParseError::MissingActionInput { tool: tool.clone() })?;

    let (raw, source) = match json_input(input_text) {
        Some(map) => (RawToolInput::Object(map), InputSource::Json),
        None => {
            let line = line_input(input_text).ok_or_else(|| ParseError::MissingActionInput {
                tool: tool.clone(),
            })?;
            (RawToolInput::Text(line), InputSource::Line)
        }
    };
    debug!(tool = %tool, ?source, "Parsed agent action");

    let input = normalize(&tool, raw);
    Ok(AgentDirective::CallTool(ToolAction {
        tool,
        input,
        source,
        log: text.to_string(),
    }))
}

fn json_input(text: &str) -> Option<serde_json::Map<String, Value>> {
    let candidate = ACTION_INPUT_JSON.captures(text)?.get(1)?.as_str();
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(err) => {
            debug!(%err, "Action input looked like JSON but did not decode");
            None
        }
    }
}

fn line_input(text: &str) -> Option<String> {
    let line = ACTION_INPUT_LINE.captures(text)?.get(1)?.as_str().trim();
    (!line.is_empty()).then(|| line.to_string())
}
