pub mod error;
pub mod loader;
pub mod provider;
pub mod server;

pub use error::ConfigError;
pub use loader::{ensure_env_loaded, load_config, load_config_with};
pub use provider::{ModelProviderConfig, ProviderKind};
pub use server::ServerConfig;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the A2A JSON-RPC server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A2aConfig {
    pub host: String,
    pub port: u16,
}

impl A2aConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// URL advertised in the agent card.
    pub fn public_url(&self) -> String {
        let host = if self.host == "0.0.0.0" {
            "localhost"
        } else {
            self.host.as_str()
        };
        format!("http://{}:{}/", host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    pub pdf_dir: PathBuf,
    pub max_pdf_size_kb: u64,
}

/// Bounds for a single agent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    pub max_iterations: usize,
    pub model_timeout: Duration,
    pub tool_timeout: Duration,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ModelProviderConfig,
    pub pdf_server: ServerConfig,
    pub a2a: A2aConfig,
    pub documents: DocumentConfig,
    pub agent: AgentSettings,
}

impl AppConfig {
    /// Load configuration from a file path (or the default path if None),
    /// applying process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        loader::load_config(path)
    }

    /// Observation size limit in bytes.
    pub fn max_observation_bytes(&self) -> usize {
        (self.documents.max_pdf_size_kb as usize).saturating_mul(1024)
    }
}
