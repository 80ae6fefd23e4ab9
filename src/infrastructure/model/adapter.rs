//! Message adapters - convert between different API formats

use crate::domain::types::{ChatMessage, MessageRole};
use serde_json::{Value, json};

pub struct MessageAdapter;

impl MessageAdapter {
    /// `[{"role": "...", "content": "..."}]`, as Ollama expects.
    pub fn to_ollama_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content
                })
            })
            .collect()
    }

    /// Returns (system_instruction_text, contents).
    pub fn to_gemini_format(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in messages {
            let role = match message.role {
                MessageRole::System => {
                    system_parts.push(message.content.as_str());
                    continue;
                }
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            };
            contents.push(json!({
                "role": role,
                "parts": [{"text": message.content}]
            }));
        }

        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system_instruction, contents)
    }
}
