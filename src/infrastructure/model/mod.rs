//! Model infrastructure module
//!
//! # Structure
//! - `types` - Request, Response, Error types
//! - `traits` - ModelProvider, ModelClient traits
//! - `adapter` - Message format adapters
//! - `factory` - Builds the configured client
//! - `clients` - Gemini and Ollama implementations
//! - `provider` - DynamicModelProvider, the `ModelProvider` the agent uses

pub mod adapter;
pub mod clients;
pub mod factory;
pub mod provider;
pub mod traits;
pub mod types;

pub use provider::DynamicModelProvider;
pub use traits::{ModelClient, ModelProvider};
pub use types::{GenerationOptions, ModelError, ModelRequest, ModelResponse};
