//! Model clients

mod base;
mod gemini;
mod ollama;

pub use base::HttpClientBase;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
