use axum::{extract::State, Json};

use super::AppState;
use crate::{
    connection::SwitchOutcome,
    error::Result,
    models::{ActionResponse, ApiResponse},
    session::SessionSnapshot,
};

fn action_response(
    state: &AppState,
    tx_hash: Option<String>,
    network_switch: Option<SwitchOutcome>,
) -> Json<ApiResponse<ActionResponse>> {
    Json(ApiResponse::success(ActionResponse {
        tx_hash,
        network_switch,
        session: state.session.snapshot(),
    }))
}

/// GET /api/v1/session
pub async fn get_session(State(state): State<AppState>) -> Json<ApiResponse<SessionSnapshot>> {
    Json(ApiResponse::success(state.session.snapshot()))
}

/// POST /api/v1/session/connect
pub async fn connect(State(state): State<AppState>) -> Result<Json<ApiResponse<ActionResponse>>> {
    let network_switch = state.session.connect().await?;
    Ok(action_response(&state, None, network_switch))
}

/// POST /api/v1/session/refresh
pub async fn refresh(State(state): State<AppState>) -> Result<Json<ApiResponse<ActionResponse>>> {
    state.session.refresh().await?;
    Ok(action_response(&state, None, None))
}

/// POST /api/v1/session/deposit
pub async fn deposit(State(state): State<AppState>) -> Result<Json<ApiResponse<ActionResponse>>> {
    let tx_hash = state.session.deposit().await?;
    Ok(action_response(&state, Some(format!("{tx_hash:?}")), None))
}

/// POST /api/v1/session/withdraw
pub async fn withdraw(State(state): State<AppState>) -> Result<Json<ApiResponse<ActionResponse>>> {
    let tx_hash = state.session.withdraw().await?;
    Ok(action_response(&state, Some(format!("{tx_hash:?}")), None))
}
