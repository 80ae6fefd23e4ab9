mod error;
mod interface;
mod manager;
mod process;

pub use error::ToolInvokeError;
pub use interface::{ToolCallResult, ToolDescriptor, ToolServerInterface};
pub use manager::ServerManager;
