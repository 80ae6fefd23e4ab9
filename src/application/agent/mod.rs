mod directive;
mod errors;
mod models;
mod runner;
pub mod runtime;


pub use directive::{AgentDirective, InputSource, ParseError, ToolAction};
pub use errors::AgentError;
pub use models::{AgentOptions, AgentOutcome, AgentStep, Termination};
pub use runner::Agent;
pub use runtime::ToolRuntime;
