use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "docextract",
    version,
    about = "PDF extraction agent served over A2A"
)]
pub struct Cli {
    /// Configuration file (defaults to config/agent.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long, short, value_enum, default_value_t = RunMode::Serve)]
    pub mode: RunMode,
    /// Overrides the configured listen host
    #[arg(long)]
    pub host: Option<String>,
    /// Overrides the configured listen port
    #[arg(long)]
    pub port: Option<u16>,
    /// Request text for `--mode ask`
    #[arg()]
    pub prompt: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RunMode {
    /// A2A JSON-RPC server
    Serve,
    /// Answer one request locally and exit
    Ask,
}

#[derive(Parser, Debug)]
#[command(
    name = "docextract-client",
    version,
    about = "Interactive client for an A2A document extraction agent"
)]
pub struct ClientCli {
    #[arg(long, default_value = "http://localhost:8005")]
    pub url: String,
    /// Send the canned test requests instead of reading stdin
    #[arg(long)]
    pub test: bool,
}
