use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use dotenv::dotenv;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod commands;
mod render;

use shared_config::ClientConfig;
use shared_models::{ClientError, TracingNotifier};

use crate::app::App;
use crate::commands::Cli;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Notices go through the log, so keep info visible by default
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        // service failures were already shown as notices
        if err.downcast_ref::<ClientError>().is_none() {
            error!("{:#}", err);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.backend_url {
        config.backend_url = url.trim_end_matches('/').to_string();
    }
    if !config.is_configured() {
        bail!("No backend configured. Set BACKEND_URL or pass --backend-url.");
    }
    debug!("Using backend {}", config.backend_url);

    let app = App::connect(config, Arc::new(TracingNotifier))?;
    commands::run(cli.command, &app).await
}
