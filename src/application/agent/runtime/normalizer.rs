//! Shapes raw `Action Input` values into tool-call arguments.

use crate::constants::{LIST_DOCUMENTS_TOOL, READ_DOCUMENT_TOOL};
use serde_json::{Map, Value};
use tracing::warn;

/// Key used when a plain string is handed to a tool without a schema.
pub const DEFAULT_INPUT_KEY: &str = "input";

const DOC_ID_FIELD: &str = "doc_id";

/// Argument shape expected by each known tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolInputSchema {
    /// Exactly one required string field, `doc_id`.
    ReadDocument,
    /// No arguments at all.
    NoArguments,
    /// Anything goes; strings are wrapped under [`DEFAULT_INPUT_KEY`].
    Passthrough,
}

impl ToolInputSchema {
    /// Tool names are compared ignoring ASCII case, like catalog lookups.
    pub fn for_tool(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            READ_DOCUMENT_TOOL => Self::ReadDocument,
            LIST_DOCUMENTS_TOOL => Self::NoArguments,
            _ => Self::Passthrough,
        }
    }
}

/// The raw value found after `Action Input:`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawToolInput {
    Text(String),
    Object(Map<String, Value>),
}

/// Why a mapping could not be validated against its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputIssue {
    MissingField(&'static str),
    WrongType { field: &'static str, expected: &'static str },
}

impl std::fmt::Display for InputIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputIssue::MissingField(field) => write!(f, "missing required field '{field}'"),
            InputIssue::WrongType { field, expected } => {
                write!(f, "field '{field}' must be a {expected}")
            }
        }
    }
}

/// Arguments ready for `tools/call`, plus any validation problem that was
/// tolerated while producing them.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedInput {
    pub arguments: Map<String, Value>,
    pub issue: Option<InputIssue>,
}

impl NormalizedInput {
    fn valid(arguments: Map<String, Value>) -> Self {
        Self {
            arguments,
            issue: None,
        }
    }
}

/// Normalizes `raw` for `tool`. Never fails: a mapping that does not fit
/// its schema is passed on unchanged with the issue attached.
pub fn normalize(tool: &str, raw: RawToolInput) -> NormalizedInput {
    let schema = ToolInputSchema::for_tool(tool);
    match raw {
        RawToolInput::Object(map) => normalize_object(tool, schema, map),
        RawToolInput::Text(text) => NormalizedInput::valid(normalize_text(schema, &text)),
    }
}

fn normalize_object(tool: &str, schema: ToolInputSchema, map: Map<String, Value>) -> NormalizedInput {
    match schema {
        ToolInputSchema::ReadDocument => match map.get(DOC_ID_FIELD) {
            Some(Value::String(doc_id)) => {
                let mut arguments = Map::new();
                arguments.insert(DOC_ID_FIELD.to_string(), Value::String(doc_id.clone()));
                NormalizedInput::valid(arguments)
            }
            other => {
                let issue = match other {
                    None => InputIssue::MissingField(DOC_ID_FIELD),
                    Some(_) => InputIssue::WrongType {
                        field: DOC_ID_FIELD,
                        expected: "string",
                    },
                };
                warn!(tool, %issue, "Tool input failed validation; passing it through");
                NormalizedInput {
                    arguments: map,
                    issue: Some(issue),
                }
            }
        },
        ToolInputSchema::NoArguments => NormalizedInput::valid(Map::new()),
        ToolInputSchema::Passthrough => NormalizedInput::valid(map),
    }
}

fn normalize_text(schema: ToolInputSchema, text: &str) -> Map<String, Value> {
    let mut arguments = Map::new();
    match schema {
        ToolInputSchema::ReadDocument => {
            let doc_id = text.trim().trim_matches(|c| c == '"' || c == '\'');
            arguments.insert(DOC_ID_FIELD.to_string(), Value::String(doc_id.to_string()));
        }
        ToolInputSchema::NoArguments => {}
        ToolInputSchema::Passthrough => {
            arguments.insert(DEFAULT_INPUT_KEY.to_string(), Value::String(text.to_string()));
        }
    }
    arguments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> RawToolInput {
        match value {
            Value::Object(map) => RawToolInput::Object(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn quoted_filename_becomes_doc_id() {
        let input = normalize(READ_DOCUMENT_TOOL, RawToolInput::Text("\"invoice.pdf\"".into()));
        assert_eq!(Value::Object(input.arguments), json!({"doc_id": "invoice.pdf"}));
        assert!(input.issue.is_none());
    }

    #[test]
    fn single_quotes_are_stripped_too() {
        let input = normalize(READ_DOCUMENT_TOOL, RawToolInput::Text("'bol.pdf'".into()));
        assert_eq!(input.arguments["doc_id"], "bol.pdf");
    }

    #[test]
    fn read_document_drops_extra_fields() {
        let input = normalize(
            READ_DOCUMENT_TOOL,
            object(json!({"doc_id": "a.pdf", "page": 2})),
        );
        assert_eq!(Value::Object(input.arguments), json!({"doc_id": "a.pdf"}));
    }

    #[test]
    fn missing_doc_id_is_reported_and_mapping_kept() {
        let input = normalize(READ_DOCUMENT_TOOL, object(json!({"file": "a.pdf"})));
        assert_eq!(input.issue, Some(InputIssue::MissingField("doc_id")));
        assert_eq!(Value::Object(input.arguments), json!({"file": "a.pdf"}));
    }

    #[test]
    fn non_string_doc_id_is_a_type_issue() {
        let input = normalize(READ_DOCUMENT_TOOL, object(json!({"doc_id": 7})));
        assert!(matches!(input.issue, Some(InputIssue::WrongType { field: "doc_id", .. })));
        assert_eq!(input.arguments["doc_id"], 7);
    }

    #[test]
    fn list_tool_takes_no_arguments() {
        let from_text = normalize(LIST_DOCUMENTS_TOOL, RawToolInput::Text("all".into()));
        let from_map = normalize(LIST_DOCUMENTS_TOOL, object(json!({"filter": "pdf"})));
        assert!(from_text.arguments.is_empty());
        assert!(from_map.arguments.is_empty());
    }

    #[test]
    fn unknown_tools_wrap_strings_and_keep_mappings() {
        let text = normalize("search", RawToolInput::Text("freight".into()));
        assert_eq!(Value::Object(text.arguments), json!({"input": "freight"}));

        let map = normalize("search", object(json!({"q": "freight"})));
        assert_eq!(Value::Object(map.arguments), json!({"q": "freight"}));
    }
}
