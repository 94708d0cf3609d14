//! GFS index and byte-range extraction service.
//!
//! Resolves the newest fully published GFS cycle, serves parsed `.idx`
//! byte maps, and extracts single GRIB messages via HTTP Range requests
//! so clients never download the multi-gigabyte forecast files.

mod config;
mod extract;
mod resolver;
mod server;
mod store;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::ModelSourceConfig;
use server::ServerState;
use store::HttpObjectStore;

#[derive(Parser, Debug)]
#[command(name = "idx-api")]
#[command(about = "GFS index and byte-range extraction API")]
struct Args {
    /// Port for the HTTP server
    #[arg(long, env = "IDX_API_PORT", default_value = "3000")]
    port: u16,

    /// Model source config file (YAML); defaults target GFS 0.25 degree
    #[arg(long, env = "IDX_API_CONFIG")]
    config: Option<PathBuf>,

    /// Outbound request timeout in seconds
    #[arg(long, default_value = "60")]
    request_timeout_secs: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => ModelSourceConfig::load(path)?,
        None => ModelSourceConfig::default(),
    };

    info!(
        bucket = %config.bucket,
        expected_forecast_files = config.expected_forecast_files,
        "Starting GFS index service"
    );

    let store = HttpObjectStore::new(Duration::from_secs(args.request_timeout_secs))?;
    let state = Arc::new(ServerState { config, store });

    server::run_server(state, args.port).await
}
