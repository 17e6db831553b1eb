mod alerts;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use state::{AppState, SimState};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fuel_daemon", about = "Fuel logistics simulation HTTP daemon")]
struct Args {
    #[arg(long, default_value = "./content/world.json")]
    config: String,
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,
    #[arg(long, default_value_t = 8000)]
    port: u16,
    /// Sample metrics (and evaluate alerts) every N ticks.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    metrics_every: u64,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let env = fuel_world::load_environment(&args.config)?;
    tracing::info!(
        config = %args.config,
        config_version = %env.meta.config_version,
        stations = env.stations.len(),
        "world loaded"
    );

    let cors_origin: HeaderValue = args
        .cors_origin
        .parse()
        .with_context(|| format!("invalid --cors-origin '{}'", args.cors_origin))?;
    let (event_tx, _) = tokio::sync::broadcast::channel(256);
    let app_state = AppState {
        sim: Arc::new(parking_lot::Mutex::new(SimState::new(env, args.metrics_every))),
        event_tx,
    };
    let app = routes::make_router_with_cors(app_state, cors_origin);

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("fuel_daemon listening on http://{addr}");
    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
