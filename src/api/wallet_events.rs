use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::{
    models::ApiResponse,
    wallet::{WalletEvent, WalletProvider},
};

#[derive(Debug, Serialize)]
pub struct WalletEventAck {
    pub delivered_to: usize,
}

/// POST /api/v1/wallet/events
///
/// Bridge for `chainChanged` / `accountsChanged` notifications raised by
/// the wallet on the page side.
pub async fn push_event(
    State(state): State<AppState>,
    Json(event): Json<WalletEvent>,
) -> Json<ApiResponse<WalletEventAck>> {
    let delivered_to = state.wallet.notify(event);
    if delivered_to == 0 {
        tracing::warn!("Wallet notification dropped: no session controller listening");
    }
    Json(ApiResponse::success(WalletEventAck { delivered_to }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{optimism_wallet, state_with};
    use crate::wallet::scripted::ScriptedWallet;
    use ethers::types::Address;
    use serde_json::json;
    use std::sync::Arc;

    fn event(body: serde_json::Value) -> Json<WalletEvent> {
        Json(serde_json::from_value(body).unwrap())
    }

    #[tokio::test]
    async fn chain_changed_reaches_running_controller() {
        let wallet = optimism_wallet();
        let state = state_with(wallet.clone());
        state.session.connect().await.unwrap();
        let mut updates = state.session.watch();

        wallet.respond("eth_chainId", Ok(json!("0x1")));
        let Json(ack) = push_event(
            State(state.clone()),
            event(json!({ "event": "chainChanged", "data": "0x1" })),
        )
        .await;

        assert!(ack.success);
        assert_eq!(ack.data.delivered_to, 1);
        let snapshot = updates
            .wait_for(|snapshot| snapshot.chain_id == Some(1))
            .await
            .unwrap()
            .clone();
        assert!(!snapshot.on_right_network);
        assert!(!snapshot.transfers_enabled);
    }

    #[tokio::test]
    async fn accounts_changed_reaches_running_controller() {
        let wallet = optimism_wallet();
        let state = state_with(wallet);
        state.session.connect().await.unwrap();
        let mut updates = state.session.watch();

        let other = "0x2000000000000000000000000000000000000002";
        push_event(
            State(state.clone()),
            event(json!({ "event": "accountsChanged", "data": [other] })),
        )
        .await;
        let expected = ethers::utils::to_checksum(&other.parse::<Address>().unwrap(), None);
        updates
            .wait_for(|snapshot| snapshot.account.as_deref() == Some(expected.as_str()))
            .await
            .unwrap();

        push_event(
            State(state.clone()),
            event(json!({ "event": "accountsChanged", "data": [] })),
        )
        .await;
        let snapshot = updates
            .wait_for(|snapshot| !snapshot.connected)
            .await
            .unwrap()
            .clone();
        assert_eq!(snapshot.connect_button_text, "Connect");
        assert!(snapshot.account.is_none());
    }

    #[tokio::test]
    async fn event_without_listener_is_acknowledged_as_undelivered() {
        let mut state = state_with(optimism_wallet());
        let unobserved: Arc<dyn WalletProvider> = Arc::new(ScriptedWallet::new());
        state.wallet = unobserved;

        let Json(ack) = push_event(
            State(state),
            event(json!({ "event": "chainChanged", "data": "0xa" })),
        )
        .await;

        assert!(ack.success);
        assert_eq!(ack.data.delivered_to, 0);
    }
}
