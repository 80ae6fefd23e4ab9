// A2A server tests over a real listener on an ephemeral port.

mod common;

use common::{PendingProvider, ScriptedProvider, StubBridge, service};
use docextract_a2a::a2a::{
    A2aClient, A2aClientError, A2aExecutor, Message, Part, SendMessageResult, ServerState,
    TaskState, TaskStore, bind, serve,
};
use docextract_a2a::model::ModelProvider;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

struct TestServer {
    url: String,
    shutdown: CancellationToken,
    _pdf_dir: TempDir,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn start(turns: &[&str]) -> TestServer {
    start_with(ScriptedProvider::new(turns)).await
}

async fn start_with<P: ModelProvider + 'static>(provider: P) -> TestServer {
    let pdf_dir = tempfile::tempdir().expect("tempdir");
    let service = service(
        provider,
        StubBridge::default(),
        pdf_dir.path().to_path_buf(),
        5,
    );
    let executor = Arc::new(A2aExecutor::new(Arc::new(service), Arc::new(TaskStore::new())));

    let listener = bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let url = format!("http://{addr}/");
    let state = Arc::new(ServerState::new(executor, url.clone()));
    let shutdown = CancellationToken::new();
    tokio::spawn(serve(listener, state, shutdown.clone()));

    TestServer {
        url,
        shutdown,
        _pdf_dir: pdf_dir,
    }
}

async fn rpc(url: &str, body: Value) -> Value {
    reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json")
}

#[tokio::test]
async fn serves_agent_card_on_both_paths() {
    let server = start(&[]).await;
    for path in [".well-known/agent.json", ".well-known/agent-card.json"] {
        let card: Value = reqwest::get(format!("{}{path}", server.url))
            .await
            .expect("get")
            .json()
            .await
            .expect("json");
        assert_eq!(card["name"], "Document Extraction Agent");
        assert_eq!(card["url"], json!(server.url));
        assert_eq!(card["skills"][0]["id"], "extract-pdf");
        assert_eq!(card["defaultOutputModes"], json!(["text", "application/json"]));
    }
}

#[tokio::test]
async fn message_send_completes_task_with_artifact() {
    let server = start(&[
        "Thought: read it\nAction: read_doc_contents\nAction Input: {\"doc_id\": \"invoice.pdf\"}",
        "Final Answer: Invoice INV-7.\n```json\n{\"invoice_number\": \"INV-7\"}\n```",
    ])
    .await;

    let mut client = A2aClient::new(&server.url).expect("client");
    client.resolve_card().await.expect("card");
    let result = client.send_message("extract invoice.pdf").await.expect("send");

    let SendMessageResult::Task(task) = &result else {
        panic!("expected a task, got {result:?}");
    };
    assert_eq!(task.status.state, TaskState::Completed);
    assert_eq!(result.reply_text().as_deref(), Some("Invoice INV-7."));
    assert_eq!(task.artifacts.len(), 1);
    assert_eq!(task.artifacts[0].name.as_deref(), Some("extraction_result"));
    assert!(matches!(
        &task.artifacts[0].parts[0],
        Part::Data { data, .. } if data["invoice_number"] == "INV-7"
    ));
    assert_eq!(task.history.len(), 2);

    let fetched = client.get_task(&task.id, Some(1)).await.expect("get task");
    assert_eq!(fetched.status.state, TaskState::Completed);
    assert_eq!(fetched.history.len(), 1);
}

#[tokio::test]
async fn model_failure_fails_task_with_internal_error() {
    let server = start(&[]).await;
    let response = rpc(
        &server.url,
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "message/send",
            "params": {"message": {
                "role": "user",
                "messageId": "m-1",
                "kind": "message",
                "parts": [{"kind": "text", "text": "list available pdfs"}]
            }}
        }),
    )
    .await;

    assert_eq!(response["id"], 7);
    assert_eq!(response["error"]["code"], -32603);
}

#[tokio::test]
async fn unknown_method_is_reported() {
    let server = start(&[]).await;
    let response = rpc(
        &server.url,
        json!({"jsonrpc": "2.0", "id": 1, "method": "tasks/resubscribe", "params": {}}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn message_without_text_is_invalid() {
    let server = start(&[]).await;
    let response = rpc(
        &server.url,
        json!({
            "jsonrpc": "2.0",
            "id": "abc",
            "method": "message/send",
            "params": {"message": {
                "role": "user",
                "messageId": "m-2",
                "parts": [{"kind": "data", "data": {"doc": "invoice.pdf"}}]
            }}
        }),
    )
    .await;
    assert_eq!(response["id"], "abc");
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn unknown_task_lookups_fail() {
    let server = start(&[]).await;
    let client = A2aClient::new(&server.url).expect("client");
    let err = client.get_task("missing", None).await.unwrap_err();
    assert!(matches!(err, A2aClientError::Rpc { code: -32001, .. }));

    let response = rpc(
        &server.url,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tasks/cancel", "params": {"id": "missing"}}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32001);
}

#[tokio::test]
async fn finished_task_cannot_be_canceled() {
    let server = start(&["Final Answer: Hello there."]).await;
    let client = A2aClient::new(&server.url).expect("client");
    let result = client.send_message("hello").await.expect("send");
    let SendMessageResult::Task(task) = result else {
        panic!("expected a task");
    };

    let response = rpc(
        &server.url,
        json!({"jsonrpc": "2.0", "id": 3, "method": "tasks/cancel", "params": {"id": task.id}}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32002);
}

#[tokio::test]
async fn wrong_protocol_version_is_rejected() {
    let server = start(&[]).await;
    let response = rpc(
        &server.url,
        json!({"jsonrpc": "1.0", "id": 4, "method": "tasks/get", "params": {"id": "x"}}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32600);
}

#[tokio::test]
async fn running_task_can_be_canceled_by_client_id() {
    let server = start_with(PendingProvider).await;
    let client = Arc::new(A2aClient::new(&server.url).expect("client"));

    let mut message = Message::user_text("extract invoice.pdf");
    message.task_id = Some("task-1".to_string());
    let sender = client.clone();
    let pending = tokio::spawn(async move { sender.send(message).await });

    let mut working = false;
    for _ in 0..100 {
        if let Ok(task) = client.get_task("task-1", None).await {
            if task.status.state == TaskState::Working {
                working = true;
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(working, "task never reached the working state");

    let canceled = client.cancel_task("task-1").await.expect("cancel");
    assert_eq!(canceled.status.state, TaskState::Canceled);

    let result = tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .expect("send finished")
        .expect("join")
        .expect("send");
    let SendMessageResult::Task(task) = result else {
        panic!("expected a task");
    };
    assert_eq!(task.id, "task-1");
    assert_eq!(task.status.state, TaskState::Canceled);
}

#[tokio::test]
async fn reused_task_id_is_rejected() {
    let server = start(&["Final Answer: Hello there."]).await;
    let client = A2aClient::new(&server.url).expect("client");

    let mut message = Message::user_text("hello");
    message.task_id = Some("task-7".to_string());
    client.send(message.clone()).await.expect("first send");

    let err = client.send(message).await.unwrap_err();
    assert!(matches!(err, A2aClientError::Rpc { code: -32602, .. }));
}
