//! HTTP client for a remote A2A agent.

use super::rpc::{RpcRequest, RpcResponse};
use super::types::{
    AgentCard, Message, MessageSendParams, SendMessageResult, Task, TaskIdParams, TaskQueryParams,
};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const CARD_PATH: &str = ".well-known/agent.json";

#[derive(Debug, Error)]
pub enum A2aClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("agent returned error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("invalid response from agent: {0}")]
    InvalidResponse(String),
}

pub struct A2aClient {
    http: Client,
    base_url: String,
    card: Option<AgentCard>,
}

impl A2aClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, A2aClientError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            http,
            base_url,
            card: None,
        })
    }

    pub fn card(&self) -> Option<&AgentCard> {
        self.card.as_ref()
    }

    /// Fetches and caches the agent card.
    pub async fn resolve_card(&mut self) -> Result<&AgentCard, A2aClientError> {
        let url = format!("{}{CARD_PATH}", self.base_url);
        debug!(url = %url, "Fetching agent card");
        let card: AgentCard = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(name = %card.name, skills = card.skills.len(), "Resolved agent card");
        Ok(self.card.insert(card))
    }

    /// Sends `text` as a new user message.
    pub async fn send_message(&self, text: &str) -> Result<SendMessageResult, A2aClientError> {
        self.send(Message::user_text(text)).await
    }

    /// Sends a prepared message. Setting `task_id` lets the caller query or
    /// cancel the task while the agent is still working on it.
    pub async fn send(&self, message: Message) -> Result<SendMessageResult, A2aClientError> {
        let params = MessageSendParams {
            message,
            metadata: None,
        };
        let result = self.call("message/send", to_params(&params)?).await?;
        SendMessageResult::from_value(result)
            .map_err(|err| A2aClientError::InvalidResponse(err.to_string()))
    }

    pub async fn get_task(
        &self,
        id: &str,
        history_length: Option<usize>,
    ) -> Result<Task, A2aClientError> {
        let params = TaskQueryParams {
            id: id.to_string(),
            history_length,
        };
        let result = self.call("tasks/get", to_params(&params)?).await?;
        serde_json::from_value(result).map_err(|err| A2aClientError::InvalidResponse(err.to_string()))
    }

    pub async fn cancel_task(&self, id: &str) -> Result<Task, A2aClientError> {
        let params = TaskIdParams { id: id.to_string() };
        let result = self.call("tasks/cancel", to_params(&params)?).await?;
        serde_json::from_value(result).map_err(|err| A2aClientError::InvalidResponse(err.to_string()))
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, A2aClientError> {
        let request = RpcRequest::new(method, params, uuid::Uuid::new_v4().to_string());
        debug!(method, "Sending JSON-RPC request");
        let response: RpcResponse = self
            .http
            .post(&self.base_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(A2aClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| A2aClientError::InvalidResponse("response has no result".to_string()))
    }
}

fn to_params<T: serde::Serialize>(params: &T) -> Result<Value, A2aClientError> {
    serde_json::to_value(params).map_err(|err| A2aClientError::InvalidResponse(err.to_string()))
}
