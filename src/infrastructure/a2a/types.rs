//! A2A protocol objects as they appear on the wire (camelCase JSON).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn message_kind() -> String {
    "message".to_string()
}

fn task_kind() -> String {
    "task".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    Text {
        text: String,
    },
    Data {
        data: Map<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<Map<String, Value>>,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            Part::Data { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default = "message_kind")]
    pub kind: String,
}

impl Message {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            role,
            parts,
            message_id: uuid::Uuid::new_v4().to_string(),
            context_id: None,
            task_id: None,
            kind: message_kind(),
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    pub fn agent(parts: Vec<Part>, task: &Task) -> Self {
        let mut message = Self::new(Role::Agent, parts);
        message.context_id = Some(task.context_id.clone());
        message.task_id = Some(task.id.clone());
        message
    }

    /// All text parts, joined by newlines; `None` when there is no text.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(Part::as_text)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect();
        (!texts.is_empty()).then(|| texts.join("\n"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Submitted,
    Working,
    Completed,
    Canceled,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Canceled | TaskState::Failed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TaskStatus {
    pub fn now(state: TaskState, message: Option<Message>) -> Self {
        Self {
            state,
            message,
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub context_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default = "task_kind")]
    pub kind: String,
}

impl Task {
    /// A freshly submitted task for `message`. A client-chosen `taskId` and
    /// `contextId` are kept so the task can be polled or canceled mid-run.
    pub fn submitted(message: &Message) -> Self {
        let id = message
            .task_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let context_id = message
            .context_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut first = message.clone();
        first.task_id = Some(id.clone());
        first.context_id = Some(context_id.clone());
        Self {
            id,
            context_id,
            status: TaskStatus::now(TaskState::Submitted, None),
            artifacts: Vec::new(),
            history: vec![first],
            kind: task_kind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendParams {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueryParams {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_length: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskIdParams {
    pub id: String,
}

/// `message/send` may answer with a task or a bare message; the `kind`
/// field says which.
#[derive(Debug, Clone, PartialEq)]
pub enum SendMessageResult {
    Task(Task),
    Message(Message),
}

impl SendMessageResult {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value.get("kind").and_then(Value::as_str) {
            Some("message") => serde_json::from_value(value).map(SendMessageResult::Message),
            _ => serde_json::from_value(value).map(SendMessageResult::Task),
        }
    }

    /// The agent's reply text, if any.
    pub fn reply_text(&self) -> Option<String> {
        match self {
            SendMessageResult::Message(message) => message.text(),
            SendMessageResult::Task(task) => task.status.message.as_ref().and_then(Message::text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    #[serde(default)]
    pub streaming: bool,
    #[serde(default)]
    pub push_notifications: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    #[serde(default)]
    pub protocol_version: Option<String>,
    pub capabilities: AgentCapabilities,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub skills: Vec<AgentSkill>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parts_are_tagged_by_kind() {
        let part: Part = serde_json::from_value(json!({"kind": "text", "text": "hi"})).expect("text part");
        assert_eq!(part, Part::text("hi"));
        let data = serde_json::to_value(Part::Data {
            data: json!({"total": 5}).as_object().cloned().unwrap_or_default(),
            metadata: None,
        })
        .expect("serializes");
        assert_eq!(data, json!({"kind": "data", "data": {"total": 5}}));
    }

    #[test]
    fn incoming_message_uses_camel_case() {
        let message: Message = serde_json::from_value(json!({
            "role": "user",
            "parts": [{"kind": "text", "text": " list pdfs "}, {"kind": "text", "text": ""}],
            "messageId": "m-1",
            "kind": "message"
        }))
        .expect("message parses");
        assert_eq!(message.message_id, "m-1");
        assert_eq!(message.text().as_deref(), Some("list pdfs"));
    }

    #[test]
    fn send_result_follows_kind() {
        let message = serde_json::to_value(Message::user_text("hello")).expect("serializes");
        assert!(matches!(
            SendMessageResult::from_value(message),
            Ok(SendMessageResult::Message(_))
        ));

        let task = Task::submitted(&Message::user_text("hello"));
        let value = serde_json::to_value(&task).expect("serializes");
        assert_eq!(value["kind"], "task");
        assert_eq!(value["status"]["state"], "submitted");
        assert!(matches!(
            SendMessageResult::from_value(value),
            Ok(SendMessageResult::Task(_))
        ));
    }

    #[test]
    fn submitted_task_keeps_client_ids() {
        let mut message = Message::user_text("extract invoice.pdf");
        message.task_id = Some("task-42".to_string());
        message.context_id = Some("ctx-1".to_string());
        let task = Task::submitted(&message);
        assert_eq!(task.id, "task-42");
        assert_eq!(task.context_id, "ctx-1");
        assert_eq!(task.history[0].task_id.as_deref(), Some("task-42"));

        let generated = Task::submitted(&Message::user_text("hello"));
        assert!(!generated.id.is_empty());
    }

    #[test]
    fn terminal_states() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Canceled.is_terminal());
        assert!(!TaskState::Working.is_terminal());
    }
}
