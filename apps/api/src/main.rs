mod config;
mod contract;
mod errors;
mod llm_client;
mod models;
mod notice;
mod render;
mod routes;
mod session;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::notice::drafter::build_drafter;
use crate::notice::models::DrafterBackend;
use crate::routes::build_router;
use crate::state::AppState;

const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Change Order API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client only when the LLM drafter is selected
    let llm = match (config.drafting_backend, &config.anthropic_api_key) {
        (DrafterBackend::Llm, Some(key)) => {
            let client = LlmClient::new(key.clone()).context("failed to build LLM client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        _ => None,
    };

    // Initialize drafter (TemplateDrafter by default; swap via DRAFTING_BACKEND)
    let drafter = build_drafter(config.drafting_backend, llm);
    info!("Drafting backend: {}", drafter.backend().as_str());

    let state = AppState::new(config.clone(), drafter);
    state.sessions.spawn_eviction(SESSION_SWEEP_PERIOD);
    info!(
        "Idle sessions expire after {}s",
        config.session_idle_ttl.as_secs()
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the form is served from a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
