// Config loading tests: file parsing, environment precedence and validation.

use docextract_a2a::config::{AppConfig, ConfigError, ProviderKind, load_config_with};
use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("agent.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

const MINIMAL: &str = r#"
[model]
provider = "gemini"
api_key = "file-key"

[pdf_server]
directory = "/srv/pdf-server"
"#;

#[test]
fn returns_error_when_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/agent.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn returns_parse_error_for_invalid_toml() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "[model\nprovider = ");
    let result = load_config_with(Some(&path), env_from(&[]));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn applies_defaults_to_minimal_file() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), MINIMAL);

    let config = load_config_with(Some(&path), env_from(&[])).expect("config");
    assert_eq!(config.provider.kind, ProviderKind::Gemini);
    assert_eq!(config.provider.model, "gemini-2.0-flash-lite-001");
    assert_eq!(config.a2a.port, 8005);
    assert_eq!(config.a2a.host, "0.0.0.0");
    assert_eq!(config.documents.max_pdf_size_kb, 7000);
    assert_eq!(config.agent.max_iterations, 5);
    assert_eq!(config.agent.model_timeout, Duration::from_secs(120));
    assert_eq!(config.max_observation_bytes(), 7000 * 1024);
    assert_eq!(
        config.pdf_server.args,
        vec![
            "--directory",
            "/srv/pdf-server",
            "run",
            "python",
            "mcp_documents_server.py"
        ]
    );
}

#[test]
fn environment_wins_over_file() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[model]
api_key = "file-key"
model = "file-model"

[pdf_server]
directory = "/srv/pdf-server"
args = ["run", "server.py"]

[a2a]
port = 9000
"#,
    );

    let config = load_config_with(
        Some(&path),
        env_from(&[
            ("GOOGLE_API_KEY", "env-key"),
            ("GEMINI_MODEL", "gemini-env"),
            ("A2A_PORT", "9100"),
            ("MCP_PDF_SERVER_ARGS", "run other.py"),
        ]),
    )
    .expect("config");

    assert_eq!(config.provider.api_key.as_deref(), Some("env-key"));
    assert_eq!(config.provider.model, "gemini-env");
    assert_eq!(config.a2a.port, 9100);
    assert_eq!(&config.pdf_server.args[2..], ["run", "other.py"]);
}

#[test]
fn gemini_requires_real_api_key() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[model]
api_key = "your-api-key-here"

[pdf_server]
directory = "/srv/pdf-server"
"#,
    );

    let result = load_config_with(Some(&path), env_from(&[]));
    assert!(matches!(result, Err(ConfigError::MissingApiKey)));
}

#[test]
fn ollama_needs_no_api_key() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
[model]
provider = "ollama"

[pdf_server]
directory = "/srv/pdf-server"
"#,
    );

    let config = load_config_with(
        Some(&path),
        env_from(&[("OLLAMA_URL", "http://ollama:11434")]),
    )
    .expect("config");
    assert_eq!(config.provider.kind, ProviderKind::Ollama);
    assert_eq!(config.provider.endpoint, "http://ollama:11434");
}

#[test]
fn server_directory_is_required() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "[model]\napi_key = \"k\"\n");
    let result = load_config_with(Some(&path), env_from(&[]));
    assert!(matches!(result, Err(ConfigError::MissingServerDir)));
}

#[test]
fn rejects_non_stdio_transport() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), MINIMAL);
    let result = load_config_with(Some(&path), env_from(&[("MCP_PDF_TRANSPORT", "sse")]));
    assert!(matches!(
        result,
        Err(ConfigError::UnsupportedTransport { transport }) if transport == "sse"
    ));
}

#[test]
fn rejects_bad_port_number() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), MINIMAL);
    let result = load_config_with(Some(&path), env_from(&[("A2A_PORT", "eighty")]));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidNumber { key, .. }) if key == "A2A_PORT"
    ));
}

#[test]
fn iteration_bound_is_at_least_one() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), &format!("{MINIMAL}\n[agent]\nmax_iterations = 0\n"));
    let config = load_config_with(Some(&path), env_from(&[])).expect("config");
    assert_eq!(config.agent.max_iterations, 1);
}

#[test]
#[serial]
fn process_environment_overrides_file() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), MINIMAL);

    unsafe {
        env::set_var("MAX_PDF_SIZE_KB", "512");
        env::set_var("PDF_DIR", "/data/incoming");
    }
    let result = AppConfig::load(Some(&path));
    unsafe {
        env::remove_var("MAX_PDF_SIZE_KB");
        env::remove_var("PDF_DIR");
    }

    let config = result.expect("config");
    assert_eq!(config.documents.max_pdf_size_kb, 512);
    assert_eq!(config.documents.pdf_dir, PathBuf::from("/data/incoming"));
}
