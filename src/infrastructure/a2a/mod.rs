mod card;
mod client;
mod executor;
mod presenter;
mod rpc;
mod server;
mod task_store;
pub mod types;

pub use card::build_agent_card;
pub use client::{A2aClient, A2aClientError};
pub use executor::A2aExecutor;
pub use presenter::{EXTRACTION_ARTIFACT, present};
pub use rpc::{
    A2aError, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, RpcError,
    RpcRequest, RpcResponse, TASK_NOT_CANCELABLE, TASK_NOT_FOUND,
};
pub use server::{ServerError, ServerState, bind, router, serve};
pub use task_store::TaskStore;
pub use types::{
    AgentCard, AgentSkill, Artifact, Message, Part, Role, SendMessageResult, Task, TaskState,
    TaskStatus,
};
