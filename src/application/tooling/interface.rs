use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::error::ToolInvokeError;

/// A tool advertised by the tool server's `tools/list` catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Outcome of `tools/call`, flattened to the text the model will observe.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    pub text: String,
    pub is_error: bool,
    pub raw: Value,
}

impl ToolCallResult {
    pub fn from_value(raw: Value) -> Self {
        let is_error = raw.get("isError").and_then(Value::as_bool).unwrap_or(false);

        let blocks: Vec<&str> = raw
            .get("content")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|block| {
                        block
                            .get("type")
                            .and_then(Value::as_str)
                            .is_some_and(|kind| kind.eq_ignore_ascii_case("text"))
                    })
                    .filter_map(|block| block.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();

        let text = if !blocks.is_empty() {
            blocks.join("\n")
        } else if let Some(structured) = raw.get("structuredContent") {
            structured.to_string()
        } else {
            raw.to_string()
        };

        Self {
            text,
            is_error,
            raw,
        }
    }
}

#[async_trait]
pub trait ToolServerInterface: Send + Sync {
    async fn list_tools(&self, server: &str) -> Result<Vec<ToolDescriptor>, ToolInvokeError>;

    async fn invoke_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<ToolCallResult, ToolInvokeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_text_blocks() {
        let result = ToolCallResult::from_value(json!({
            "content": [
                { "type": "text", "text": "page 1" },
                { "type": "image", "data": "..." },
                { "type": "text", "text": "page 2" }
            ]
        }));
        assert_eq!(result.text, "page 1\npage 2");
        assert!(!result.is_error);
    }

    #[test]
    fn keeps_error_text() {
        let result = ToolCallResult::from_value(json!({
            "content": [{ "type": "text", "text": "Document missing.pdf not found" }],
            "isError": true
        }));
        assert!(result.is_error);
        assert_eq!(result.text, "Document missing.pdf not found");
    }

    #[test]
    fn falls_back_to_structured_content() {
        let result = ToolCallResult::from_value(json!({
            "content": [],
            "structuredContent": { "files": ["a.pdf"] }
        }));
        assert_eq!(result.text, r#"{"files":["a.pdf"]}"#);
    }
}
