use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const TASK_NOT_FOUND: i64 = -32001;
pub const TASK_NOT_CANCELABLE: i64 = -32002;

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Value, id: impl Into<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params: Some(params),
            id: Some(id.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Option<Value>,
}

impl RpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }

    pub fn from_a2a_error(id: Option<Value>, error: &A2aError) -> Self {
        Self::error(id, error.code(), error.to_string())
    }
}

/// Protocol-level failures, each with its JSON-RPC code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum A2aError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Method '{0}' not found")]
    MethodNotFound(String),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Task '{0}' not found")]
    TaskNotFound(String),
    #[error("Task '{0}' cannot be canceled")]
    TaskNotCancelable(String),
}

impl A2aError {
    pub fn code(&self) -> i64 {
        match self {
            A2aError::InvalidRequest(_) => INVALID_REQUEST,
            A2aError::MethodNotFound(_) => METHOD_NOT_FOUND,
            A2aError::InvalidParams(_) => INVALID_PARAMS,
            A2aError::Internal(_) => INTERNAL_ERROR,
            A2aError::TaskNotFound(_) => TASK_NOT_FOUND,
            A2aError::TaskNotCancelable(_) => TASK_NOT_CANCELABLE,
        }
    }
}
