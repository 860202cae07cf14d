mod chat;
mod config;
mod controller;
mod errors;
mod evaluation;
mod llm_client;
mod models;
mod report;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::GeminiChatBackend;
use crate::config::Config;
use crate::evaluation::GeminiEvaluator;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::{spawn_idle_sweeper, AppState};

const SWEEP_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast when no API key is configured
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("gradpath_api={},tower_http=info", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting GradPath API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_api_base.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState::new(
        Arc::new(GeminiEvaluator::new(llm.clone())),
        Arc::new(GeminiChatBackend::new(llm)),
    );

    let _sweeper = spawn_idle_sweeper(
        state.sessions.clone(),
        Duration::from_secs(SWEEP_INTERVAL_SECS),
        Duration::from_secs(config.session_idle_secs),
    );
    info!("Idle sessions expire after {}s", config.session_idle_secs);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
