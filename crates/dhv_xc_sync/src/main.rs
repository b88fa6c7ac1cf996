use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dhv_xc_client::config::Config;
use dhv_xc_client::http_client::ReqwestXcClient;
use dhv_xc_sync::cli::Cli;
use dhv_xc_sync::{logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    match sync(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn sync(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing::debug!(api = %config.api_base_url, flights = %config.flight_base_url, "endpoints");
    let client = ReqwestXcClient::from_config(&config)?;

    run(Arc::new(client), &cli.credentials(), &cli.options()).await?;
    Ok(())
}
