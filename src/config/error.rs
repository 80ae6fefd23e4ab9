use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("GOOGLE_API_KEY is not set; the gemini provider needs an API key")]
    MissingApiKey,

    #[error("MCP_PDF_SERVER_DIR is not set; the PDF tool server directory is required")]
    MissingServerDir,

    #[error("unsupported MCP transport '{transport}' (only 'stdio' is available)")]
    UnsupportedTransport { transport: String },

    #[error("unsupported model provider '{provider}' (expected 'gemini' or 'ollama')")]
    UnsupportedProvider { provider: String },

    #[error("invalid numeric value '{value}' for {key}")]
    InvalidNumber { key: String, value: String },
}
