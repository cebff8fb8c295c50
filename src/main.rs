mod api;
mod config;
mod error;
mod leaf;
mod ledger;
mod merkle;
mod registry;
mod service;

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::AppState;
use config::Config;
use ledger::AchievementLedger;
use service::EligibilityService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let state = AppState {
        service: Arc::new(EligibilityService::new(config.default_amount)),
        ledger: Arc::new(AchievementLedger::new()),
        default_campaign: config.default_campaign.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .context("CORS_ORIGIN is not a valid origin")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let app = api::router(state, cors);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "merkledrop service listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
