#![allow(dead_code)]

use async_trait::async_trait;
use docextract_a2a::agent::{Agent, AgentOptions, ToolRuntime};
use docextract_a2a::config::DocumentConfig;
use docextract_a2a::constants::PDF_SERVER_NAME;
use docextract_a2a::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use docextract_a2a::service::ExtractionService;
use docextract_a2a::tooling::{
    ToolCallResult, ToolDescriptor, ToolInvokeError, ToolServerInterface,
};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Tool server double answering with canned PDF text.
#[derive(Clone, Default)]
pub struct StubBridge {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl StubBridge {
    pub async fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ToolServerInterface for StubBridge {
    async fn list_tools(&self, _server: &str) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        Ok(catalog())
    }

    async fn invoke_tool(
        &self,
        _server: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<ToolCallResult, ToolInvokeError> {
        self.calls.lock().await.push((tool.to_string(), arguments.clone()));
        let text = match (tool, arguments.get("doc_id").and_then(Value::as_str)) {
            ("list_available_pdfs", _) => "invoice.pdf\nbill-of-lading-template.pdf".to_string(),
            (_, Some("invoice.pdf")) => "COMMERCIAL INVOICE\nInvoice No: INV-7\nTotal: 1200 USD".to_string(),
            (_, Some(other)) => {
                return Ok(ToolCallResult::from_value(json!({
                    "content": [{"type": "text", "text": format!("File {other} not found")}],
                    "isError": true
                })));
            }
            _ => "missing doc_id".to_string(),
        };
        Ok(ToolCallResult::from_value(
            json!({"content": [{"type": "text", "text": text}]}),
        ))
    }
}

/// Model double replaying fixed turns in order.
#[derive(Clone)]
pub struct ScriptedProvider {
    turns: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(turns: &[&str]) -> Self {
        Self {
            turns: Arc::new(Mutex::new(turns.iter().map(|t| t.to_string()).collect())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let mut turns = self.turns.lock().await;
        if turns.is_empty() {
            return Err(ModelError::invalid_response("scripted", "script exhausted"));
        }
        let prompt = request
            .messages
            .iter()
            .map(|message| message.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().await.push(prompt);
        Ok(ModelResponse::new(turns.remove(0)))
    }
}

/// Model double whose calls never return; the run only ends by cancellation.
#[derive(Clone, Default)]
pub struct PendingProvider;

#[async_trait]
impl ModelProvider for PendingProvider {
    async fn chat(&self, _request: ModelRequest) -> Result<ModelResponse, ModelError> {
        std::future::pending().await
    }
}

pub fn service<P: ModelProvider>(
    provider: P,
    bridge: StubBridge,
    pdf_dir: PathBuf,
    max_iterations: usize,
) -> ExtractionService<P> {
    let runtime = ToolRuntime::new(
        PDF_SERVER_NAME,
        catalog(),
        Arc::new(bridge),
        Duration::from_secs(5),
        64 * 1024,
    );
    let options = AgentOptions {
        max_iterations,
        model_timeout: Duration::from_secs(5),
    };
    let agent = Agent::new(Arc::new(provider), Arc::new(runtime), options);
    ExtractionService::new(
        agent,
        DocumentConfig {
            pdf_dir,
            max_pdf_size_kb: 64,
        },
    )
}

fn catalog() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new("list_available_pdfs", "List the PDF files that can be read"),
        ToolDescriptor::new("read_doc_contents", "Read the text of a PDF by doc_id"),
    ]
}
