use ethers::types::{Address, TransactionRequest, H256, U256};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::constants::{DEFAULT_RAW_DEPOSIT_WEI, DEFAULT_VAULT_AMOUNT};
use crate::contracts::{
    vault_deposit_calldata, vault_withdraw_all_calldata, vault_withdraw_calldata,
};
use crate::error::{AppError, Result};
use crate::wallet::methods::{self, ReceiptStatus};
use crate::wallet::WalletProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Deposit,
    Withdraw,
}

/// How the vault is driven. Earlier vault revisions took a plain value
/// transfer and an argument-less `withdraw()`; later ones take explicit
/// amounts and parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum TransferStyle {
    RawValue { amount: u128 },
    VaultMethods { amount: u128 },
}

impl TransferStyle {
    pub fn from_name(name: &str, amount: Option<u128>) -> anyhow::Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "raw_value" | "raw" => Ok(TransferStyle::RawValue {
                amount: amount.unwrap_or(DEFAULT_RAW_DEPOSIT_WEI),
            }),
            "vault_methods" | "vault" => Ok(TransferStyle::VaultMethods {
                amount: amount.unwrap_or(DEFAULT_VAULT_AMOUNT),
            }),
            other => anyhow::bail!("Unknown TRANSFER_STYLE '{other}'"),
        }
    }

    pub fn amount(&self) -> u128 {
        match self {
            TransferStyle::RawValue { amount } | TransferStyle::VaultMethods { amount } => *amount,
        }
    }

    pub fn build(&self, kind: TransferKind, vault: Address, account: Address) -> TransactionRequest {
        let tx = TransactionRequest::new().from(account).to(vault);
        match (self, kind) {
            (TransferStyle::RawValue { amount }, TransferKind::Deposit) => {
                tx.value(U256::from(*amount))
            }
            (TransferStyle::RawValue { .. }, TransferKind::Withdraw) => {
                tx.data(vault_withdraw_all_calldata())
            }
            (TransferStyle::VaultMethods { amount }, TransferKind::Deposit) => {
                tx.data(vault_deposit_calldata(U256::from(*amount), account))
            }
            (TransferStyle::VaultMethods { amount }, TransferKind::Withdraw) => {
                tx.data(vault_withdraw_calldata(U256::from(*amount), account, account))
            }
        }
    }
}

pub struct TransferExecutor {
    vault: Address,
    style: TransferStyle,
    poll_interval: Duration,
    timeout: Duration,
}

impl TransferExecutor {
    pub fn new(vault: Address, style: TransferStyle, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            vault,
            style,
            poll_interval,
            timeout,
        }
    }

    pub async fn submit(
        &self,
        wallet: &dyn WalletProvider,
        kind: TransferKind,
        account: Address,
    ) -> Result<H256> {
        let tx = self.style.build(kind, self.vault, account);
        let tx_hash = methods::send_transaction(wallet, &tx).await?;
        tracing::info!("{:?} submitted from {:?}: {:?}", kind, account, tx_hash);
        Ok(tx_hash)
    }

    /// Polls until the transaction has one confirmation or the timeout passes.
    /// Failed polls are retried; only a mined receipt or the deadline ends the wait.
    pub async fn wait_for_confirmation(
        &self,
        wallet: &dyn WalletProvider,
        tx_hash: H256,
    ) -> Result<ReceiptStatus> {
        // No representable deadline means the wait is unbounded.
        let deadline = Instant::now().checked_add(self.timeout);
        loop {
            match methods::transaction_receipt(wallet, tx_hash).await {
                Ok(Some(receipt)) if receipt.transaction_hash != tx_hash => {
                    tracing::warn!(
                        "Receipt for {:?} returned while polling {:?}, ignoring",
                        receipt.transaction_hash,
                        tx_hash
                    );
                }
                Ok(Some(receipt)) if receipt.block_number.is_some() => {
                    if !receipt.succeeded() {
                        return Err(AppError::TransactionReverted(format!("{tx_hash:?}")));
                    }
                    tracing::info!("Transaction {:?} confirmed", tx_hash);
                    return Ok(receipt);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Receipt poll for {:?} failed, retrying: {}", tx_hash, e);
                }
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(AppError::ConfirmationTimeout(format!("{tx_hash:?}")));
            }
            sleep(self.poll_interval).await;
        }
    }
}
