use ethers::types::{Address, Bytes, TransactionRequest, H256, U256, U64};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{NetworkDefinition, WalletProvider};
use crate::error::{AppError, Result};

/// The subset of a receipt needed to decide confirmation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptStatus {
    pub transaction_hash: H256,
    pub block_number: Option<U64>,
    pub status: Option<U64>,
}

impl ReceiptStatus {
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| !s.is_zero()).unwrap_or(true)
    }
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Transport(format!("Unexpected {method} response: {e}")))
}

/// Parses a chain id given as `"0xa"`, `"10"` or a JSON number.
pub fn parse_chain_id(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let raw = value.as_str()?.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

pub async fn request_accounts(wallet: &dyn WalletProvider) -> Result<Vec<Address>> {
    let value = wallet.request("eth_requestAccounts", json!([])).await?;
    decode("eth_requestAccounts", value)
}

pub async fn accounts(wallet: &dyn WalletProvider) -> Result<Vec<Address>> {
    let value = wallet.request("eth_accounts", json!([])).await?;
    decode("eth_accounts", value)
}

pub async fn chain_id(wallet: &dyn WalletProvider) -> Result<u64> {
    let value = wallet.request("eth_chainId", json!([])).await?;
    parse_chain_id(&value)
        .ok_or_else(|| AppError::Transport(format!("Unparseable chain id: {value}")))
}

pub async fn get_balance(wallet: &dyn WalletProvider, account: Address) -> Result<U256> {
    let value = wallet
        .request("eth_getBalance", json!([account, "latest"]))
        .await?;
    decode("eth_getBalance", value)
}

pub async fn call(wallet: &dyn WalletProvider, to: Address, data: Bytes) -> Result<Bytes> {
    let value = wallet
        .request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
        .await?;
    decode("eth_call", value)
}

pub async fn send_transaction(wallet: &dyn WalletProvider, tx: &TransactionRequest) -> Result<H256> {
    let value = wallet.request("eth_sendTransaction", json!([tx])).await?;
    decode("eth_sendTransaction", value)
}

pub async fn transaction_receipt(
    wallet: &dyn WalletProvider,
    tx_hash: H256,
) -> Result<Option<ReceiptStatus>> {
    let value = wallet
        .request("eth_getTransactionReceipt", json!([tx_hash]))
        .await?;
    decode("eth_getTransactionReceipt", value)
}

pub async fn switch_chain(wallet: &dyn WalletProvider, chain_id_hex: &str) -> Result<()> {
    wallet
        .request(
            "wallet_switchEthereumChain",
            json!([{ "chainId": chain_id_hex }]),
        )
        .await?;
    Ok(())
}

pub async fn add_chain(wallet: &dyn WalletProvider, network: &NetworkDefinition) -> Result<()> {
    wallet
        .request("wallet_addEthereumChain", json!([network]))
        .await?;
    Ok(())
}
