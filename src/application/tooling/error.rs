use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("tool server '{server}' is not configured")]
    NotConfigured { server: String },
    #[error("failed to spawn tool server '{server}': {source}")]
    Spawn {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tool server '{server}' transport error: {message}")]
    Transport { server: String, message: String },
    #[error("tool server '{server}' sent invalid JSON: {source}")]
    InvalidJson {
        server: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tool server '{server}' returned JSON-RPC error {code}: {message}")]
    Rpc {
        server: String,
        code: i64,
        message: String,
    },
    #[error("tool server '{server}' terminated unexpectedly")]
    Terminated { server: String },
    #[error("tool server '{server}' request cancelled")]
    Cancelled { server: String },
}
