use super::card::build_agent_card;
use super::executor::A2aExecutor;
use super::rpc::{A2aError, INVALID_REQUEST, RpcRequest, RpcResponse};
use super::types::{AgentCard, MessageSendParams, TaskIdParams, TaskQueryParams};
use crate::infrastructure::model::ModelProvider;
use axum::extract::State;
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub struct ServerState<P: ModelProvider> {
    executor: Arc<A2aExecutor<P>>,
    card: AgentCard,
}

impl<P: ModelProvider> ServerState<P> {
    pub fn new(executor: Arc<A2aExecutor<P>>, public_url: impl Into<String>) -> Self {
        Self {
            executor,
            card: build_agent_card(public_url),
        }
    }

    pub fn card(&self) -> &AgentCard {
        &self.card
    }
}

pub fn router<P>(state: Arc<ServerState<P>>) -> Router
where
    P: ModelProvider + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/.well-known/agent.json", get(card_handler::<P>))
        .route("/.well-known/agent-card.json", get(card_handler::<P>))
        .route("/", post(handle_rpc::<P>))
        .layer(cors)
        .with_state(state)
}

/// Serves the agent on `listener` until `shutdown` fires.
pub async fn serve<P>(
    listener: TcpListener,
    state: Arc<ServerState<P>>,
    shutdown: CancellationToken,
) -> Result<(), ServerError>
where
    P: ModelProvider + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "A2A server ready to accept connections");
    }
    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(ServerError::Serve)
}

pub async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
    info!(addr, "Binding A2A server");
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })
}

async fn card_handler<P: ModelProvider>(State(state): State<Arc<ServerState<P>>>) -> Json<AgentCard> {
    Json(state.card().clone())
}

async fn handle_rpc<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Json(request): Json<RpcRequest>,
) -> Json<RpcResponse> {
    debug!(method = %request.method, "Received JSON-RPC request");

    if request.jsonrpc != "2.0" {
        return Json(RpcResponse::error(
            request.id,
            INVALID_REQUEST,
            "Unsupported jsonrpc version (expected 2.0)",
        ));
    }

    let id = request.id.clone();
    let executor = &state.executor;
    let result = match request.method.as_str() {
        "message/send" => match params::<MessageSendParams>(request.params) {
            Ok(params) => executor.send_message(params).await.and_then(to_value),
            Err(err) => Err(err),
        },
        "tasks/get" => match params::<TaskQueryParams>(request.params) {
            Ok(params) => executor.get_task(params).await.and_then(to_value),
            Err(err) => Err(err),
        },
        "tasks/cancel" => match params::<TaskIdParams>(request.params) {
            Ok(params) => executor.cancel_task(params).await.and_then(to_value),
            Err(err) => Err(err),
        },
        other => Err(A2aError::MethodNotFound(other.to_string())),
    };

    Json(match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => {
            error!(code = err.code(), error = %err, "JSON-RPC request failed");
            RpcResponse::from_a2a_error(id, &err)
        }
    })
}

fn params<T: DeserializeOwned>(raw: Option<Value>) -> Result<T, A2aError> {
    let raw = raw.ok_or_else(|| A2aError::InvalidParams("params are required".to_string()))?;
    serde_json::from_value(raw).map_err(|err| A2aError::InvalidParams(err.to_string()))
}

fn to_value<T: Serialize>(value: T) -> Result<Value, A2aError> {
    serde_json::to_value(value).map_err(|err| A2aError::Internal(err.to_string()))
}
