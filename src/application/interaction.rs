//! Line-oriented session against a running agent.

use crate::infrastructure::a2a::{
    A2aClient, A2aClientError, AgentCard, Part, SendMessageResult, TaskState,
};
use thiserror::Error;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

/// Requests sent by `--test`, covering listing, extraction and a missing file.
pub const TEST_MESSAGES: [&str; 4] = [
    "list available pdfs",
    "extract bill-of-lading-template.pdf",
    "what's in invoice.pdf?",
    "extract non-existent.pdf",
];

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Client(#[from] A2aClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Empty,
    Send(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" => Command::Empty,
            "quit" | "exit" | "q" => Command::Quit,
            "help" | "?" => Command::Help,
            _ => Command::Send(line.to_string()),
        }
    }
}

pub fn render_card(card: &AgentCard) -> String {
    let mut out = format!("Connected to {} v{}\n{}\n", card.name, card.version, card.description);
    if !card.skills.is_empty() {
        out.push_str("\nSkills:\n");
        for skill in &card.skills {
            out.push_str(&format!("  - {}: {}\n", skill.name, skill.description));
        }
    }
    out
}

pub fn render_help(card: Option<&AgentCard>) -> String {
    let mut out = String::from("Type a request, 'help' for examples or 'quit' to exit.\n");
    let examples: Vec<&str> = card
        .map(|card| {
            card.skills
                .iter()
                .flat_map(|skill| skill.examples.iter().map(String::as_str))
                .collect()
        })
        .unwrap_or_default();
    if !examples.is_empty() {
        out.push_str("Examples:\n");
        for example in examples {
            out.push_str(&format!("  {example}\n"));
        }
    }
    out
}

/// Reply text plus any structured data, as shown to the user.
pub fn render_result(result: &SendMessageResult) -> String {
    let mut out = result
        .reply_text()
        .unwrap_or_else(|| "(no reply text)".to_string());

    let (state, parts) = match result {
        SendMessageResult::Task(task) => (
            Some(task.status.state),
            task.artifacts.iter().flat_map(|a| a.parts.iter()).collect::<Vec<_>>(),
        ),
        SendMessageResult::Message(message) => (None, message.parts.iter().collect()),
    };

    for part in parts {
        if let Part::Data { data, .. } = part {
            let pretty = serde_json::to_string_pretty(data).unwrap_or_default();
            out.push_str("\n\nExtracted data:\n");
            out.push_str(&pretty);
        }
    }
    if let Some(state) = state.filter(|state| *state != TaskState::Completed) {
        out.push_str(&format!("\n[task {state:?}]"));
    }
    out
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<(), io::Error> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

/// Reads requests from `input` until EOF or `quit`.
pub async fn run_session<R, W>(
    client: &mut A2aClient,
    input: R,
    out: &mut W,
) -> Result<(), InteractionError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match client.resolve_card().await {
        Ok(card) => {
            let text = render_card(card);
            write_line(out, &text).await?;
        }
        Err(err) => {
            warn!(error = %err, "Could not resolve agent card");
            write_line(out, &format!("Agent card unavailable: {err}")).await?;
        }
    }
    write_line(out, &render_help(client.card())).await?;

    let mut lines = input.lines();
    loop {
        out.write_all(b"> ").await?;
        out.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Empty => continue,
            Command::Help => write_line(out, &render_help(client.card())).await?,
            Command::Send(text) => {
                debug!(request = %text, "Sending request");
                let reply = match client.send_message(&text).await {
                    Ok(result) => render_result(&result),
                    Err(err) => format!("Request failed: {err}"),
                };
                write_line(out, &reply).await?;
            }
        }
    }
    write_line(out, "Goodbye.").await?;
    Ok(())
}

/// Sends [`TEST_MESSAGES`] one after another and prints each reply.
pub async fn run_test_messages<W: AsyncWrite + Unpin>(
    client: &mut A2aClient,
    out: &mut W,
) -> Result<(), InteractionError> {
    let card = client.resolve_card().await?;
    let text = render_card(card);
    write_line(out, &text).await?;

    for message in TEST_MESSAGES {
        write_line(out, &format!("> {message}")).await?;
        let reply = match client.send_message(message).await {
            Ok(result) => render_result(&result),
            Err(err) => format!("Request failed: {err}"),
        };
        write_line(out, &reply).await?;
    }
    Ok(())
}

/// Interactive session on the process's stdin and stdout.
pub async fn run_stdio(client: &mut A2aClient) -> Result<(), InteractionError> {
    let stdin = BufReader::new(io::stdin());
    let mut stdout = io::stdout();
    run_session(client, stdin, &mut stdout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::a2a::{Message, Task, TaskStatus, build_agent_card};
    use serde_json::json;

    #[test]
    fn commands_are_recognised() {
        assert_eq!(Command::parse("  QUIT "), Command::Quit);
        assert_eq!(Command::parse("help"), Command::Help);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(
            Command::parse(" extract invoice.pdf "),
            Command::Send("extract invoice.pdf".to_string())
        );
    }

    #[test]
    fn help_lists_skill_examples() {
        let card = build_agent_card("http://localhost:8005/");
        let help = render_help(Some(&card));
        assert!(help.contains("extract invoice.pdf"));
        assert!(help.contains("list available pdfs"));
        assert!(render_card(&card).contains("Document Extraction Agent"));
    }

    #[test]
    fn task_result_shows_reply_and_data() {
        let mut task = Task::submitted(&Message::user_text("extract invoice.pdf"));
        let data = json!({"invoice_number": "INV-1"}).as_object().cloned().unwrap();
        let reply = Message::agent(vec![Part::text("Invoice INV-1")], &task);
        task.status = TaskStatus::now(TaskState::Completed, Some(reply));
        task.artifacts.push(crate::infrastructure::a2a::Artifact {
            artifact_id: "a1".to_string(),
            name: Some("extraction_result".to_string()),
            parts: vec![Part::Data {
                data,
                metadata: None,
            }],
        });

        let text = render_result(&SendMessageResult::Task(task));
        assert!(text.starts_with("Invoice INV-1"));
        assert!(text.contains("\"invoice_number\": \"INV-1\""));
        assert!(!text.contains("[task"));
    }

    #[test]
    fn failed_task_is_flagged() {
        let mut task = Task::submitted(&Message::user_text("extract"));
        task.status = TaskStatus::now(TaskState::Failed, None);
        let text = render_result(&SendMessageResult::Task(task));
        assert!(text.contains("[task Failed]"));
    }
}
