use super::error::ConfigError;
use super::provider::{ModelProviderConfig, ProviderKind, RawProviderConfig};
use super::server::{RawServer, ServerConfig, split_args};
use super::{A2aConfig, AgentSettings, AppConfig, DocumentConfig};
use crate::constants::{
    API_KEY_PLACEHOLDER, CONFIG_PATH, DEFAULT_A2A_HOST, DEFAULT_A2A_PORT, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MAX_PDF_SIZE_KB, DEFAULT_MCP_ARGS, DEFAULT_MCP_COMMAND, DEFAULT_MCP_TRANSPORT,
    DEFAULT_MODEL_TIMEOUT_SECS, DEFAULT_PDF_DIR, DEFAULT_TOOL_TIMEOUT_SECS, ENV_PATH,
};
use dotenvy::{dotenv, from_filename};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Once;
use std::time::Duration;
use tracing::debug;

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    model: RawProviderConfig,
    #[serde(default)]
    pdf_server: RawServer,
    #[serde(default)]
    a2a: RawA2a,
    #[serde(default)]
    documents: RawDocuments,
    #[serde(default)]
    agent: RawAgent,
}

#[derive(Debug, Deserialize, Default)]
struct RawA2a {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
struct RawDocuments {
    pdf_dir: Option<String>,
    max_pdf_size_kb: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct RawAgent {
    max_iterations: Option<usize>,
    model_timeout_secs: Option<u64>,
    tool_timeout_secs: Option<u64>,
}

/// Ensures environment variables are loaded from `.env` and `config/.env`
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = dotenv();
        let _ = from_filename(ENV_PATH);
    });
}

/// Load configuration using the process environment for overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup.
///
/// Precedence is environment, then file, then built-in defaults. An explicit
/// `path` must exist; the default path is optional.
pub fn load_config_with<F>(path: Option<&Path>, env: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = match path {
        Some(path) => read_config(path)?,
        None => {
            let default_path = Path::new(CONFIG_PATH);
            if default_path.exists() {
                read_config(default_path)?
            } else {
                debug!(path = CONFIG_PATH, "No config file, using defaults");
                RawConfig::default()
            }
        }
    };

    validate_and_build(raw, &env)
}

fn read_config(path: &Path) -> Result<RawConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn env_value<F>(env: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_number<F, T>(env: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match env_value(env, key) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber {
                key: key.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

fn validate_and_build<F>(raw: RawConfig, env: &F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let RawConfig {
        mut model,
        pdf_server,
        a2a,
        documents,
        agent,
    } = raw;

    let provider_name = env_value(env, "MODEL_PROVIDER")
        .or(model.provider.take())
        .unwrap_or_else(|| ProviderKind::Gemini.as_str().to_string());
    let kind = ProviderKind::parse(&provider_name).ok_or(ConfigError::UnsupportedProvider {
        provider: provider_name,
    })?;

    if let Some(key) = env_value(env, "GOOGLE_API_KEY") {
        model.api_key = Some(key);
    }
    if let Some(name) = env_value(env, "GEMINI_MODEL").filter(|_| kind == ProviderKind::Gemini) {
        model.model = Some(name);
    }
    if let Some(url) = env_value(env, "OLLAMA_URL").filter(|_| kind == ProviderKind::Ollama) {
        model.endpoint = Some(url);
    }
    let provider = ModelProviderConfig::from_raw(kind, model);
    if provider.requires_api_key()
        && provider
            .api_key
            .as_deref()
            .is_none_or(|key| key == API_KEY_PLACEHOLDER)
    {
        return Err(ConfigError::MissingApiKey);
    }

    let transport = env_value(env, "MCP_PDF_TRANSPORT")
        .or(pdf_server.transport)
        .unwrap_or_else(|| DEFAULT_MCP_TRANSPORT.to_string());
    if !transport.eq_ignore_ascii_case(DEFAULT_MCP_TRANSPORT) {
        return Err(ConfigError::UnsupportedTransport { transport });
    }
    let directory = env_value(env, "MCP_PDF_SERVER_DIR")
        .or(pdf_server.directory)
        .ok_or(ConfigError::MissingServerDir)?;
    let command = env_value(env, "MCP_PDF_SERVER_COMMAND")
        .or(pdf_server.command)
        .unwrap_or_else(|| DEFAULT_MCP_COMMAND.to_string());
    let args = match env_value(env, "MCP_PDF_SERVER_ARGS") {
        Some(value) => split_args(&value),
        None => pdf_server
            .args
            .unwrap_or_else(|| split_args(DEFAULT_MCP_ARGS)),
    };
    let pdf_server = ServerConfig::build(&command, args, &directory, pdf_server.env);

    let a2a = A2aConfig {
        host: env_value(env, "A2A_HOST")
            .or(a2a.host)
            .unwrap_or_else(|| DEFAULT_A2A_HOST.to_string()),
        port: env_number(env, "A2A_PORT")?
            .or(a2a.port)
            .unwrap_or(DEFAULT_A2A_PORT),
    };

    let documents = DocumentConfig {
        pdf_dir: PathBuf::from(super::server::expand(
            &env_value(env, "PDF_DIR")
                .or(documents.pdf_dir)
                .unwrap_or_else(|| DEFAULT_PDF_DIR.to_string()),
        )),
        max_pdf_size_kb: env_number(env, "MAX_PDF_SIZE_KB")?
            .or(documents.max_pdf_size_kb)
            .unwrap_or(DEFAULT_MAX_PDF_SIZE_KB),
    };

    let agent = AgentSettings {
        max_iterations: agent
            .max_iterations
            .unwrap_or(DEFAULT_MAX_ITERATIONS)
            .max(1),
        model_timeout: Duration::from_secs(
            agent.model_timeout_secs.unwrap_or(DEFAULT_MODEL_TIMEOUT_SECS),
        ),
        tool_timeout: Duration::from_secs(
            agent.tool_timeout_secs.unwrap_or(DEFAULT_TOOL_TIMEOUT_SECS),
        ),
    };

    Ok(AppConfig {
        provider,
        pdf_server,
        a2a,
        documents,
        agent,
    })
}
