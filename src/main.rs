use clap::Parser;
use docextract_a2a::cli::Cli;
use std::error::Error;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    docextract_a2a::init_tracing();
    info!("Starting docextract");
    docextract_a2a::run(Cli::parse()).await
}
