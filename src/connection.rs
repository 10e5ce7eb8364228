use ethers::types::Address;
use serde::Serialize;

use crate::constants::REQUIRED_CHAIN_ID_HEX;
use crate::error::{AppError, Result};
use crate::network_guard::{NetworkGuard, NetworkStatus};
use crate::wallet::{methods, NetworkDefinition, WalletProvider};

/// What the network switch step ended with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "snake_case")]
pub enum SwitchOutcome {
    Switched,
    Registered,
    RegistrationFailed(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ConnectReport {
    pub accounts: Vec<Address>,
    pub switch: SwitchOutcome,
    pub network: NetworkStatus,
}

pub struct ConnectionFlow {
    guard: NetworkGuard,
    network: NetworkDefinition,
}

impl ConnectionFlow {
    pub fn new(guard: NetworkGuard, network: NetworkDefinition) -> Self {
        Self { guard, network }
    }

    /// Account access, then network switch with a single registration
    /// fallback, then a fresh guard reading. Only a failed account request
    /// aborts; switch and registration failures leave the guard to decide.
    pub async fn connect(&self, wallet: &dyn WalletProvider) -> Result<ConnectReport> {
        let accounts = methods::request_accounts(wallet).await?;
        if accounts.is_empty() {
            return Err(AppError::UserRejected(
                "Wallet returned no accounts".to_string(),
            ));
        }
        tracing::info!("Wallet granted {} account(s), active {:?}", accounts.len(), accounts[0]);

        let switch = self.switch_network(wallet).await;
        let network = self.guard.check(wallet).await;

        Ok(ConnectReport {
            accounts,
            switch,
            network,
        })
    }

    async fn switch_network(&self, wallet: &dyn WalletProvider) -> SwitchOutcome {
        match methods::switch_chain(wallet, REQUIRED_CHAIN_ID_HEX).await {
            Ok(()) => SwitchOutcome::Switched,
            Err(AppError::UnrecognizedChain(reason)) => {
                tracing::info!(
                    "Wallet does not know chain {}, registering it: {}",
                    REQUIRED_CHAIN_ID_HEX,
                    reason
                );
                match methods::add_chain(wallet, &self.network).await {
                    Ok(()) => SwitchOutcome::Registered,
                    Err(e) => {
                        tracing::warn!("Network registration failed: {}", e);
                        SwitchOutcome::RegistrationFailed(e.to_string())
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Network switch failed: {}", e);
                SwitchOutcome::Failed(e.to_string())
            }
        }
    }
}
