use crate::application::tooling::ToolInvokeError;
use crate::infrastructure::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("failed to load tool catalog: {0}")]
    Catalog(#[from] ToolInvokeError),
    #[error("agent run was cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Model(err) => err.user_message(),
            AgentError::Catalog(_) => {
                "The PDF tools are not available right now. Please try again later.".to_string()
            }
            AgentError::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}
