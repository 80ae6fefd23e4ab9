//! Child-process transport for a stdio tool server.
//!
//! Requests are newline-delimited JSON-RPC messages written to the child's
//! stdin. A background reader task routes responses back to the waiting
//! caller by request id, so several agent runs can share one process.

use super::error::ToolInvokeError;
use super::interface::{ToolCallResult, ToolDescriptor};
use crate::config::ServerConfig;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2025-06-18";

type Responder = oneshot::Sender<Result<Value, ToolInvokeError>>;

#[derive(Clone)]
pub struct McpProcess {
    inner: Arc<McpProcessInner>,
}

struct McpProcessInner {
    server: ServerConfig,
    startup: AsyncMutex<()>,
    child: AsyncMutex<Option<Child>>,
    writer: AsyncMutex<Option<BufWriter<ChildStdin>>>,
    pending: AsyncMutex<HashMap<String, Responder>>,
    id_counter: AtomicU64,
    catalog: AsyncMutex<Vec<ToolDescriptor>>,
}

impl McpProcess {
    pub fn new(server: ServerConfig) -> Self {
        Self {
            inner: Arc::new(McpProcessInner {
                server,
                startup: AsyncMutex::new(()),
                child: AsyncMutex::new(None),
                writer: AsyncMutex::new(None),
                pending: AsyncMutex::new(HashMap::new()),
                id_counter: AtomicU64::new(1),
                catalog: AsyncMutex::new(Vec::new()),
            }),
        }
    }

    pub(super) async fn ensure_running(&self) -> Result<(), ToolInvokeError> {
        self.inner.ensure_running().await
    }

    pub(super) async fn call_tool(
        &self,
        tool: &str,
        arguments: Value,
    ) -> Result<ToolCallResult, ToolInvokeError> {
        self.ensure_running().await?;
        self.inner.call_tool(tool, arguments).await
    }

    /// Returns the cached catalog, refreshing it if the server reported none.
    pub(super) async fn tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        self.ensure_running().await?;
        let cached = self.inner.catalog.lock().await.clone();
        if !cached.is_empty() {
            return Ok(cached);
        }
        self.inner.refresh_tools().await?;
        Ok(self.inner.catalog.lock().await.clone())
    }

    pub(super) async fn ping(&self) -> Result<(), ToolInvokeError> {
        self.ensure_running().await?;
        self.inner.send_request("ping", json!({})).await.map(|_| ())
    }

    pub(super) async fn shutdown(&self) {
        self.inner.reset().await;
    }
}

impl McpProcessInner {
    async fn ensure_running(self: &Arc<Self>) -> Result<(), ToolInvokeError> {
        let _startup = self.startup.lock().await;
        {
            let child = self.child.lock().await;
            if child.is_some() {
                return Ok(());
            }
        }

        let mut command = Command::new(&self.server.command);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &self.server.workdir {
            command.current_dir(dir);
        }
        command.args(&self.server.args);
        for (key, value) in &self.server.env {
            command.env(key, value);
        }

        info!(
            server = %self.server.name,
            command = %self.server.command.display(),
            "Starting tool server"
        );
        let mut child = command.spawn().map_err(|source| ToolInvokeError::Spawn {
            server: self.server.name.clone(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdout"))?;

        *self.writer.lock().await = Some(BufWriter::new(stdin));
        *self.child.lock().await = Some(child);

        let reader_self = Arc::clone(self);
        tokio::spawn(async move {
            reader_self.reader_loop(stdout).await;
        });

        match self.initialize_sequence().await {
            Ok(_) => Ok(()),
            Err(err) => {
                self.reset().await;
                Err(err)
            }
        }
    }

    async fn initialize_sequence(&self) -> Result<(), ToolInvokeError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "title": "Document Extraction Agent"
            },
            "capabilities": {}
        });
        let init = self.send_request("initialize", params).await?;
        debug!(
            server = %self.server.name,
            protocol = init
                .get("protocolVersion")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default(),
            "Tool server initialized"
        );
        self.send_notification("notifications/initialized", json!({}))
            .await?;

        self.refresh_tools().await
    }

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<ToolCallResult, ToolInvokeError> {
        let params = json!({
            "name": tool,
            "arguments": match arguments {
                Value::Null => Value::Object(Default::default()),
                other => other,
            }
        });
        let response = self.send_request("tools/call", params).await?;
        Ok(ToolCallResult::from_value(response))
    }

    async fn refresh_tools(&self) -> Result<(), ToolInvokeError> {
        let result = self.send_request("tools/list", json!({})).await?;
        let tools = parse_catalog(&result);
        debug!(server = %self.server.name, count = tools.len(), "Tool catalog refreshed");
        *self.catalog.lock().await = tools;
        Ok(())
    }

    async fn reader_loop(self: Arc<Self>, stdout: ChildStdout) {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(raw)) = lines.next_line().await {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !trimmed.starts_with('{') {
                debug!(server = %self.server.name, line = trimmed, "Skipping non-JSON line from tool server");
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => {
                    if let Err(err) = self.process_inbound_message(value).await {
                        warn!(server = %self.server.name, %err, "Failed to process tool server message");
                    }
                }
                Err(source) => {
                    warn!(server = %self.server.name, line = trimmed, %source, "Received invalid JSON from tool server");
                }
            }
        }

        self.reset().await;
    }

    async fn process_inbound_message(&self, value: Value) -> Result<(), ToolInvokeError> {
        match (value.get("id").cloned(), value.get("method").and_then(Value::as_str)) {
            (Some(id), Some(method)) => self.handle_server_request(id, method).await,
            (Some(id), None) => {
                self.handle_response(id, value).await;
                Ok(())
            }
            (None, Some(method)) => {
                self.handle_notification(method).await;
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }

    async fn handle_response(&self, id: Value, value: Value) {
        let Some(key) = response_key(&id) else {
            return;
        };
        let Some(sender) = self.pending.lock().await.remove(&key) else {
            debug!(server = %self.server.name, response_id = key, "Response for unknown request");
            return;
        };

        let outcome = match value.get("error") {
            Some(error) => Err(ToolInvokeError::Rpc {
                server: self.server.name.clone(),
                code: error.get("code").and_then(Value::as_i64).unwrap_or(-32000),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            }),
            None => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
        };
        let _ = sender.send(outcome);
    }

    async fn handle_server_request(&self, id: Value, method: &str) -> Result<(), ToolInvokeError> {
        if method == "ping" {
            return self
                .write_message(&json!({ "jsonrpc": "2.0", "id": id, "result": {} }))
                .await;
        }

        warn!(server = %self.server.name, method, "Tool server sent unsupported request");
        self.write_message(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {
                "code": -32601,
                "message": format!("client does not implement method '{method}'"),
            }
        }))
        .await
    }

    async fn handle_notification(&self, method: &str) {
        debug!(server = %self.server.name, method, "Notification from tool server");
        if method == "notifications/tools/list_changed" {
            // Cleared here and refetched lazily; a request issued from the
            // reader task would wait on its own response forever.
            self.catalog.lock().await.clear();
        }
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ToolInvokeError> {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        if let Err(err) = self.write_message(&payload).await {
            self.pending.lock().await.remove(&id);
            return Err(err);
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(ToolInvokeError::Cancelled {
                server: self.server.name.clone(),
            }),
        }
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ToolInvokeError> {
        self.write_message(&json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        }))
        .await
    }

    async fn write_message(&self, message: &Value) -> Result<(), ToolInvokeError> {
        let mut encoded =
            serde_json::to_vec(message).map_err(|source| ToolInvokeError::InvalidJson {
                server: self.server.name.clone(),
                source,
            })?;
        encoded.push(b'\n');

        let mut writer = self.writer.lock().await;
        let stream = writer
            .as_mut()
            .ok_or_else(|| self.transport_error("writer not initialised"))?;
        stream
            .write_all(&encoded)
            .await
            .map_err(|source| self.transport_error(source.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|source| self.transport_error(source.to_string()))
    }

    async fn reset(&self) {
        self.writer.lock().await.take();

        if let Some(mut child) = self.child.lock().await.take() {
            if let Err(err) = child.kill().await {
                debug!(server = %self.server.name, %err, "Tool server already exited");
            }
            let _ = child.wait().await;
        }

        for (_, sender) in self.pending.lock().await.drain() {
            let _ = sender.send(Err(ToolInvokeError::Terminated {
                server: self.server.name.clone(),
            }));
        }
        self.catalog.lock().await.clear();
    }

    fn next_id(&self) -> String {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        format!("req-{id}")
    }

    fn transport_error(&self, message: impl Into<String>) -> ToolInvokeError {
        ToolInvokeError::Transport {
            server: self.server.name.clone(),
            message: message.into(),
        }
    }
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

/// Reads `tools/list` output, keeping the server's order.
fn parse_catalog(result: &Value) -> Vec<ToolDescriptor> {
    result
        .get("tools")
        .and_then(Value::as_array)
        .map(|tools| {
            tools
                .iter()
                .filter_map(|tool| {
                    let name = tool.get("name").and_then(Value::as_str)?;
                    let description = tool
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    Some(ToolDescriptor::new(name, description.trim()))
                })
                .collect()
        })
        .unwrap_or_default()
}
