use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pantry_api::{app, AppConfig, AppState};

/// REST API for generic data collections
#[derive(Debug, Parser)]
#[command(name = "pantry-api", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// sqlx connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    // Parsed after dotenv so PORT / DATABASE_URL from .env reach the flags
    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    tracing::info!("Starting pantry-api in {:?} mode", config.environment);

    let port = config.server.port;
    let state = AppState::connect(config)
        .await
        .context("failed to initialise application state")?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Server up on http://{}", bind_addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
