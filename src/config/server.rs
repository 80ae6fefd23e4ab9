use crate::constants::PDF_SERVER_NAME;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// How the agent spawns the PDF tool server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct RawServer {
    pub(super) command: Option<String>,
    pub(super) args: Option<Vec<String>>,
    pub(super) directory: Option<String>,
    pub(super) transport: Option<String>,
    #[serde(default)]
    pub(super) env: HashMap<String, String>,
}

pub(super) fn expand(s: &str) -> String {
    shellexpand::full(s)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

impl ServerConfig {
    /// Builds the `uv --directory <dir> run ...` style invocation.
    pub(super) fn build(
        command: &str,
        args: Vec<String>,
        directory: &str,
        env: HashMap<String, String>,
    ) -> Self {
        let directory = expand(directory);
        let mut full_args = vec!["--directory".to_string(), directory.clone()];
        full_args.extend(args.iter().map(|arg| expand(arg)));

        Self {
            name: PDF_SERVER_NAME.to_string(),
            command: PathBuf::from(expand(command)),
            args: full_args,
            env,
            workdir: Some(PathBuf::from(directory)),
        }
    }
}

/// Splits an argument string the way the deployment scripts write it.
pub(super) fn split_args(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn prepends_directory_flag_and_expands_vars() {
        unsafe {
            env::set_var("DOCX_TEST_MCP_ROOT", "/srv/mcp");
        }

        let config = ServerConfig::build(
            "uv",
            split_args("run python mcp_documents_server.py"),
            "${DOCX_TEST_MCP_ROOT}/pdf",
            HashMap::new(),
        );

        assert_eq!(config.name, PDF_SERVER_NAME);
        assert_eq!(
            config.args,
            vec![
                "--directory",
                "/srv/mcp/pdf",
                "run",
                "python",
                "mcp_documents_server.py"
            ]
        );
        assert_eq!(config.workdir, Some(PathBuf::from("/srv/mcp/pdf")));

        unsafe {
            env::remove_var("DOCX_TEST_MCP_ROOT");
        }
    }
}
