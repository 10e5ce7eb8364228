use crate::constants::REQUIRED_CHAIN_ID;
use crate::error::{AppError, Result};
use crate::wallet::{methods, WalletProvider};

/// Result of one chain id check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkStatus {
    pub chain_id: Option<u64>,
    pub on_right_network: bool,
}

impl NetworkStatus {
    pub fn unknown() -> Self {
        Self {
            chain_id: None,
            on_right_network: false,
        }
    }
}

pub fn is_required_chain(chain_id: u64) -> bool {
    chain_id == REQUIRED_CHAIN_ID
}

/// Gates transfers on the wallet being on the required chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkGuard;

impl NetworkGuard {
    /// Asks the wallet for its active chain. Any failure reads as the wrong network.
    pub async fn check(&self, wallet: &dyn WalletProvider) -> NetworkStatus {
        match methods::chain_id(wallet).await {
            Ok(chain_id) => NetworkStatus {
                chain_id: Some(chain_id),
                on_right_network: is_required_chain(chain_id),
            },
            Err(e) => {
                tracing::warn!("Chain id query failed, treating as wrong network: {}", e);
                NetworkStatus::unknown()
            }
        }
    }

    /// Transfer precondition: connected and on the required chain.
    pub fn ensure_transfer_allowed(&self, connected: bool, network: NetworkStatus) -> Result<()> {
        if !connected {
            return Err(AppError::NotConnected);
        }
        if !network.on_right_network {
            return Err(AppError::WrongNetwork {
                expected: REQUIRED_CHAIN_ID,
                actual: network.chain_id,
            });
        }
        Ok(())
    }
}
