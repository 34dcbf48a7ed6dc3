mod config;
mod errors;
mod export;
mod layout;
mod routes;
mod search;
mod state;
mod views;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::HttpImageSource;
use crate::routes::build_router;
use crate::search::DuckDuckGoClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ImageSearch v{}", env!("CARGO_PKG_VERSION"));

    let search = DuckDuckGoClient::new(&config.user_agent, &config.search_region, config.safesearch)?;
    info!(
        "Search provider: DuckDuckGo (region {}, safesearch {:?})",
        config.search_region, config.safesearch
    );

    let images = HttpImageSource::new(
        &config.user_agent,
        Duration::from_secs(config.fetch_timeout_secs),
    )?;
    info!("Image fetch timeout: {}s", config.fetch_timeout_secs);

    let state = AppState {
        config: config.clone(),
        search: Arc::new(search),
        images: Arc::new(images),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
