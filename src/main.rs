use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod balance;
mod config;
mod connection;
mod constants;
mod contracts;
mod controller;
mod error;
mod models;
mod network_guard;
mod session;
mod transfer;
mod wallet;
mod websocket;

use config::Config;
use constants::{API_VERSION, REQUIRED_CHAIN_ID};
use controller::SessionController;
use wallet::RpcWallet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "return_vault_client=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Return vault client");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);
    tracing::info!("Required chain id: {}", REQUIRED_CHAIN_ID);
    tracing::info!("Transfer style: {:?}", config.transfer_style);
    if config.is_development() {
        tracing::warn!("Development mode: CORS is permissive unless CORS_ALLOWED_ORIGINS is set");
    }

    // Wallet adapter and session controller
    let wallet = Arc::new(RpcWallet::new(
        config.wallet_rpc_url.clone(),
        Duration::from_secs(config.wallet_rpc_timeout_secs),
    )?);
    let session = SessionController::new(&config, wallet.clone())?.spawn();

    let app_state = api::AppState {
        session,
        wallet,
        config: config.clone(),
    };

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Session
        .route("/api/v1/session", get(api::session::get_session))
        .route("/api/v1/session/connect", post(api::session::connect))
        .route("/api/v1/session/refresh", post(api::session::refresh))
        .route("/api/v1/session/deposit", post(api::session::deposit))
        .route("/api/v1/session/withdraw", post(api::session::withdraw))
        // Wallet notification bridge
        .route(
            "/api/v1/wallet/events",
            post(api::wallet_events::push_event),
        )
        // WebSocket endpoints
        .route("/ws/session", get(websocket::session::handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
