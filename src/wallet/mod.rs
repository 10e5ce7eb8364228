pub mod methods;
pub mod rpc_wallet;
#[cfg(test)]
pub mod scripted;

pub use rpc_wallet::RpcWallet;

use async_trait::async_trait;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::Result;

/// Request/notification surface of an EIP-1193 style wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value>;

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;

    /// Fans a wallet notification out to subscribers; returns how many got it.
    fn notify(&self, event: WalletEvent) -> usize;
}

/// Notifications the wallet pushes without being asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WalletEvent {
    #[serde(rename = "chainChanged")]
    ChainChanged(String),
    #[serde(rename = "accountsChanged")]
    AccountsChanged(Vec<Address>),
}

/// Parameters of `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDefinition {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    pub block_explorer_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

impl NetworkDefinition {
    pub fn optimism(rpc_url: &str) -> Self {
        use crate::constants::{
            NATIVE_DECIMALS, NETWORK_CHAIN_NAME, NETWORK_CURRENCY_NAME, NETWORK_CURRENCY_SYMBOL,
            NETWORK_EXPLORER_URL, REQUIRED_CHAIN_ID_HEX,
        };

        Self {
            chain_id: REQUIRED_CHAIN_ID_HEX.to_string(),
            chain_name: NETWORK_CHAIN_NAME.to_string(),
            rpc_urls: vec![rpc_url.to_string()],
            native_currency: NativeCurrency {
                name: NETWORK_CURRENCY_NAME.to_string(),
                symbol: NETWORK_CURRENCY_SYMBOL.to_string(),
                decimals: NATIVE_DECIMALS,
            },
            block_explorer_urls: vec![NETWORK_EXPLORER_URL.to_string()],
        }
    }
}
