use serde::Deserialize;
use std::env;
use url::Url;

use crate::constants::{
    MAX_RECEIPT_TIMEOUT_SECS, NETWORK_RPC_URL, RECEIPT_POLL_INTERVAL_MS, RECEIPT_TIMEOUT_SECS,
    WALLET_RPC_TIMEOUT_SECS,
};
use crate::transfer::TransferStyle;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Wallet endpoint
    pub wallet_rpc_url: String,
    pub wallet_rpc_timeout_secs: u64,

    // Network registration
    pub network_rpc_url: String,

    // Transfers
    pub transfer_style: TransferStyle,
    pub receipt_poll_interval_ms: u64,
    pub receipt_timeout_secs: u64,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let style_name = env::var("TRANSFER_STYLE").unwrap_or_else(|_| "vault_methods".to_string());
        let amount = env::var("TRANSFER_AMOUNT")
            .ok()
            .map(|raw| raw.trim().parse::<u128>())
            .transpose()?;
        let transfer_style = TransferStyle::from_name(&style_name, amount)?;

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            wallet_rpc_url: env::var("WALLET_RPC_URL")?,
            wallet_rpc_timeout_secs: env::var("WALLET_RPC_TIMEOUT_SECS")
                .unwrap_or_else(|_| WALLET_RPC_TIMEOUT_SECS.to_string())
                .parse()?,

            network_rpc_url: env::var("NETWORK_RPC_URL")
                .unwrap_or_else(|_| NETWORK_RPC_URL.to_string()),

            transfer_style,
            receipt_poll_interval_ms: env::var("RECEIPT_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| RECEIPT_POLL_INTERVAL_MS.to_string())
                .parse()?,
            receipt_timeout_secs: env::var("RECEIPT_TIMEOUT_SECS")
                .unwrap_or_else(|_| RECEIPT_TIMEOUT_SECS.to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.wallet_rpc_url.trim().is_empty() {
            anyhow::bail!("WALLET_RPC_URL is empty");
        }
        Url::parse(&self.wallet_rpc_url)
            .map_err(|e| anyhow::anyhow!("Invalid WALLET_RPC_URL: {e}"))?;
        Url::parse(&self.network_rpc_url)
            .map_err(|e| anyhow::anyhow!("Invalid NETWORK_RPC_URL: {e}"))?;

        if self.receipt_poll_interval_ms == 0 {
            anyhow::bail!("RECEIPT_POLL_INTERVAL_MS must be > 0");
        }
        if self.receipt_timeout_secs > MAX_RECEIPT_TIMEOUT_SECS {
            anyhow::bail!(
                "RECEIPT_TIMEOUT_SECS={} exceeds the {}s limit",
                self.receipt_timeout_secs,
                MAX_RECEIPT_TIMEOUT_SECS
            );
        }
        if self.receipt_timeout_secs == 0 {
            tracing::warn!("RECEIPT_TIMEOUT_SECS is 0; every confirmation wait will time out");
        }
        if self.wallet_rpc_timeout_secs < 30 {
            tracing::warn!(
                "WALLET_RPC_TIMEOUT_SECS={} may be shorter than a user takes to approve a prompt",
                self.wallet_rpc_timeout_secs
            );
        }
        if self.transfer_style.amount() == 0 {
            tracing::warn!("Transfer amount is zero; deposits will move nothing");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development" || self.environment == "local"
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        environment: "test".to_string(),
        wallet_rpc_url: "http://127.0.0.1:8545".to_string(),
        wallet_rpc_timeout_secs: WALLET_RPC_TIMEOUT_SECS,
        network_rpc_url: NETWORK_RPC_URL.to_string(),
        transfer_style: TransferStyle::VaultMethods {
            amount: crate::constants::DEFAULT_VAULT_AMOUNT,
        },
        receipt_poll_interval_ms: 1,
        receipt_timeout_secs: 5,
        cors_allowed_origins: "*".to_string(),
    }
}
