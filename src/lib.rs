pub mod application;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, extraction, interaction, service, tooling};
pub use infrastructure::{a2a, model};

use bootstrap::AppContext;
use cli::{Cli, RunMode};
use config::AppConfig;
use std::error::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.a2a.host = host;
    }
    if let Some(port) = cli.port {
        config.a2a.port = port;
    }

    let context = AppContext::build(config).await?;
    let result = match cli.mode {
        RunMode::Serve => serve(&context).await,
        RunMode::Ask => ask(&context, &cli.prompt.join(" ")).await,
    };
    context.shutdown().await;
    result
}

async fn serve(context: &AppContext) -> Result<(), Box<dyn Error>> {
    let addr = format!("{}:{}", context.config().a2a.host, context.config().a2a.port);
    let listener = a2a::bind(&addr).await?;
    info!(card = %context.config().a2a.public_url(), "Agent card published");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for shutdown signal");
            return;
        }
        info!("Shutdown signal received");
        signal.cancel();
    });

    a2a::serve(listener, context.server_state(), shutdown).await?;
    Ok(())
}

async fn ask(context: &AppContext, prompt: &str) -> Result<(), Box<dyn Error>> {
    let service = context.service();
    let response = service.process_message(prompt, &CancellationToken::new()).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
