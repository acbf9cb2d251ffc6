use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod directory;
mod error;
mod models;
mod web;

use crate::config::Config;
use crate::directory::TraderDirectory;
use crate::web::server::start_server;
use crate::web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging, RUST_LOG overrides the default level
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Arc::new(Config::load()?);
    info!("Configuration loaded successfully");

    let directory = match &config.directory_fixture_path {
        Some(path) => TraderDirectory::from_json_file(path)?,
        None => {
            info!("No DIRECTORY_FIXTURE_PATH set, serving the demo directory");
            TraderDirectory::demo()
        }
    };
    info!(
        "Trader directory ready: {} traders, {} trades",
        directory.traders().len(),
        directory.trades().len()
    );

    let state = AppState::new(config.clone(), Arc::new(directory))?;
    state.init().await?;
    info!(
        "Upstreams: citadel={} conductor={} payments={}",
        config.citadel_url, config.conductor_url, config.payments_url
    );

    info!("Starting Obscura gateway...");
    start_server(state, config).await?;

    Ok(())
}
