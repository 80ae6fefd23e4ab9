//! Application constants
//!
//! Single source of truth for paths, defaults and tool names.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/agent.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-lite-001";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_API_PATH: &str = "v1beta/models";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://127.0.0.1:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Placeholder shipped in sample `.env` files; treated as "not set".
pub const API_KEY_PLACEHOLDER: &str = "your-api-key-here";

/// Name under which the PDF tool server is registered.
pub const PDF_SERVER_NAME: &str = "pdf-extractor";
pub const DEFAULT_MCP_COMMAND: &str = "uv";
pub const DEFAULT_MCP_ARGS: &str = "run python mcp_documents_server.py";
pub const DEFAULT_MCP_TRANSPORT: &str = "stdio";

pub const READ_DOCUMENT_TOOL: &str = "read_doc_contents";
pub const LIST_DOCUMENTS_TOOL: &str = "list_available_pdfs";

pub const DEFAULT_A2A_HOST: &str = "0.0.0.0";
pub const DEFAULT_A2A_PORT: u16 = 8005;

pub const DEFAULT_MAX_PDF_SIZE_KB: u64 = 7000;
pub const DEFAULT_PDF_DIR: &str = "./data/pdfs";

pub const DEFAULT_MAX_ITERATIONS: usize = 5;
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 60;

/// Tasks kept in memory before finished ones are evicted, oldest first.
pub const DEFAULT_MAX_TASKS: usize = 1000;
