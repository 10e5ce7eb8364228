use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::broadcast;

use super::{WalletEvent, WalletProvider};
use crate::constants::WALLET_EVENT_CAPACITY;
use crate::error::{AppError, Result};

fn rpc_request(id: u32, method: &str, params: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": id
    })
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

fn into_result(response: RpcResponse) -> Result<serde_json::Value> {
    if let Some(err) = response.error {
        return Err(AppError::from_rpc(err.code, err.message));
    }
    Ok(response.result.unwrap_or(serde_json::Value::Null))
}

/// Wallet reached over JSON-RPC (signer proxy, browser bridge, or a dev
/// node with unlocked accounts). Notifications are pushed in through
/// [`RpcWallet::notify`] by the event bridge endpoint.
pub struct RpcWallet {
    rpc_url: String,
    client: reqwest::Client,
    events: broadcast::Sender<WalletEvent>,
}

impl RpcWallet {
    pub fn new(rpc_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Cannot build wallet HTTP client: {e}")))?;
        let (events, _) = broadcast::channel(WALLET_EVENT_CAPACITY);
        Ok(Self {
            rpc_url,
            client,
            events,
        })
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let request = rpc_request(rand::random::<u32>(), method, params);
        tracing::debug!("Wallet request {}", method);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        into_result(body)
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: WalletEvent) -> usize {
        tracing::debug!("Wallet notification: {:?}", event);
        self.events.send(event).unwrap_or(0)
    }
}
