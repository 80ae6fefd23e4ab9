use clap::Parser;
use docextract_a2a::a2a::A2aClient;
use docextract_a2a::cli::ClientCli;
use docextract_a2a::interaction;
use std::error::Error;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    docextract_a2a::init_tracing();
    let cli = ClientCli::parse();
    info!(url = %cli.url, "Connecting to agent");

    let mut client = A2aClient::new(&cli.url)?;
    if cli.test {
        let mut stdout = tokio::io::stdout();
        interaction::run_test_messages(&mut client, &mut stdout).await?;
    } else {
        interaction::run_stdio(&mut client).await?;
    }
    Ok(())
}
