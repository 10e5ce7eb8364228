use axum::{extract::State, Json};
use serde::Serialize;
use url::Url;

use super::AppState;
use crate::constants::REQUIRED_CHAIN_ID;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub wallet_host: Option<String>,
    pub wallet: String,
    pub required_chain_id: u64,
}

/// Host part only; wallet URLs may carry credentials in path or query.
fn endpoint_host(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let wallet_status = if state.session.snapshot().connected {
        "connected".to_string()
    } else {
        "disconnected".to_string()
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        wallet_host: endpoint_host(&state.config.wallet_rpc_url),
        wallet: wallet_status,
        required_chain_id: REQUIRED_CHAIN_ID,
    })
}
