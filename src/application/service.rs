//! Request handling on top of the agent: input checks, the tool-use guard
//! and the single-document extraction path.

use crate::application::agent::{Agent, AgentError, AgentOutcome};
use crate::application::extraction::{classify_document, strip_json_blocks};
use crate::config::DocumentConfig;
use crate::domain::{Document, DomainError, ExtractionResult};
use crate::infrastructure::model::ModelProvider;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const EMPTY_MESSAGE: &str = "User message cannot be empty";
const TOOLS_REQUIRED: &str =
    "I need to use the available tools to read PDF files. Please ensure I have access to the MCP tools.";
const DOCUMENT_KEYWORDS: [&str; 5] = ["pdf", "invoice", "extract", "analyze", "document"];
const EXTRACTION_CONFIDENCE: f64 = 0.9;
const DATA_ONLY_MESSAGE: &str = "Extracted data is attached.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// What the caller sees for one natural-language request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub iteration_limit_reached: bool,
}

impl UserResponse {
    pub fn success(message: impl Into<String>, data: Option<Map<String, Value>>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error: None,
            iteration_limit_reached: false,
        }
    }

    pub fn declined(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: None,
            iteration_limit_reached: false,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: "Error processing request".to_string(),
            data: None,
            error: Some(error.into()),
            iteration_limit_reached: false,
        }
    }
}

pub struct ExtractionService<P: ModelProvider> {
    agent: Agent<P>,
    documents: DocumentConfig,
}

impl<P: ModelProvider> ExtractionService<P> {
    pub fn new(agent: Agent<P>, documents: DocumentConfig) -> Self {
        Self { agent, documents }
    }

    pub fn agent(&self) -> &Agent<P> {
        &self.agent
    }

    /// Answers a free-form request. Recoverable conditions come back as an
    /// unsuccessful [`UserResponse`]; model failures and cancellation are
    /// errors.
    pub async fn process_message(
        &self,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<UserResponse, AgentError> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(UserResponse::error(EMPTY_MESSAGE));
        }

        let outcome = self.agent.run(message, cancel).await?;
        Ok(respond(message, outcome))
    }

    /// Looks `filename` up in the PDF directory.
    pub async fn locate(&self, filename: &str) -> Result<Document, DomainError> {
        let path = self.documents.pdf_dir.join(filename);
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Err(DomainError::DocumentNotFound(filename.to_string())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(DomainError::DocumentNotFound(filename.to_string()));
            }
            Err(err) => {
                return Err(DomainError::InvalidDocument(format!(
                    "cannot read {}: {err}",
                    path.display()
                )));
            }
        };
        Document::new(filename, metadata.len())
    }

    /// Runs a fixed extraction prompt for one document.
    pub async fn extract(
        &self,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Result<ExtractionResult, ServiceError> {
        document.ensure_within_limit(self.documents.max_pdf_size_kb)?;
        if document.is_empty() {
            warn!(filename = document.filename(), "Extracting from an empty file");
        }

        let prompt = format!(
            "Extract structured data from the PDF file: {}",
            document.filename()
        );
        let outcome = self.agent.run(&prompt, cancel).await?;
        let document_type = classify_document(&outcome.extracted_data, &outcome.output);
        info!(
            filename = document.filename(),
            document_type = document_type.as_str(),
            fields = outcome.extracted_data.len(),
            "Extraction finished"
        );

        Ok(ExtractionResult::new(
            document_type,
            outcome.extracted_data,
            EXTRACTION_CONFIDENCE,
            outcome.output,
            Some(document.filename().to_string()),
        )?)
    }
}

fn mentions_documents(message: &str) -> bool {
    let lower = message.to_lowercase();
    DOCUMENT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

fn respond(message: &str, outcome: AgentOutcome) -> UserResponse {
    if !outcome.tools_used() && mentions_documents(message) {
        warn!("Agent answered a document request without reading any document");
        return UserResponse::declined(TOOLS_REQUIRED);
    }

    let limit_reached = outcome.iteration_limit_reached();
    let (message, data) = if outcome.extracted_data.is_empty() {
        (outcome.output, None)
    } else {
        let prose = strip_json_blocks(&outcome.output);
        let prose = if prose.is_empty() {
            DATA_ONLY_MESSAGE.to_string()
        } else {
            prose
        };
        (prose, Some(outcome.extracted_data))
    };
    let mut response = UserResponse::success(message, data);
    response.iteration_limit_reached = limit_reached;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::agent::{AgentStep, InputSource, Termination};
    use serde_json::json;

    fn outcome(output: &str, data: Value, steps: usize) -> AgentOutcome {
        AgentOutcome {
            output: output.to_string(),
            extracted_data: data.as_object().cloned().unwrap_or_default(),
            steps: (0..steps)
                .map(|_| AgentStep {
                    tool: "read_doc_contents".into(),
                    input: json!({"doc_id": "a.pdf"}),
                    input_source: InputSource::Json,
                    input_issue: None,
                    success: true,
                    observation: "text".into(),
                })
                .collect(),
            iterations: steps,
            termination: Termination::Finished,
        }
    }

    #[test]
    fn document_request_without_tools_is_declined() {
        let response = respond("Extract invoice.pdf", outcome("Invoice total 50", json!({}), 0));
        assert!(!response.success);
        assert_eq!(response.message, TOOLS_REQUIRED);
        assert!(response.data.is_none());
    }

    #[test]
    fn small_talk_without_tools_is_fine() {
        let response = respond("hello", outcome("Hi!", json!({}), 0));
        assert!(response.success);
        assert_eq!(response.message, "Hi!");
    }

    #[test]
    fn extracted_data_is_attached() {
        let response = respond(
            "extract invoice.pdf",
            outcome("Summary", json!({"total": "50"}), 1),
        );
        assert!(response.success);
        assert_eq!(response.data, json!({"total": "50"}).as_object().cloned());
    }

    #[test]
    fn fenced_data_is_removed_from_the_message() {
        let response = respond(
            "extract invoice.pdf",
            outcome(
                "Invoice 123.\n```json\n{\"total\": \"50\"}\n```",
                json!({"total": "50"}),
                1,
            ),
        );
        assert_eq!(response.message, "Invoice 123.");
        assert_eq!(response.data, json!({"total": "50"}).as_object().cloned());
    }

    #[test]
    fn error_response_shape() {
        let value = serde_json::to_value(UserResponse::error(EMPTY_MESSAGE)).expect("serializes");
        assert_eq!(
            value,
            json!({
                "success": false,
                "message": "Error processing request",
                "error": "User message cannot be empty"
            })
        );
    }
}
