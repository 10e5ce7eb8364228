use chrono::{DateTime, Utc};
use ethers::types::{Address, H256};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::balance::Balances;
use crate::error::{AppError, Severity};
use crate::network_guard::NetworkStatus;
use crate::transfer::TransferKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingTransaction {
    pub kind: TransferKind,
    pub tx_hash: String,
    pub submitted_at: DateTime<Utc>,
}

/// What happened to the last user action or wallet event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    Success {
        tx_hash: Option<String>,
    },
    Recoverable {
        code: String,
        message: String,
    },
    Fatal {
        code: String,
        message: String,
    },
}

impl ActionOutcome {
    pub fn from_error(error: &AppError) -> Self {
        let code = error.code().to_string();
        let message = error.to_string();
        match error.severity() {
            Severity::Recoverable => ActionOutcome::Recoverable { code, message },
            Severity::Fatal => ActionOutcome::Fatal { code, message },
        }
    }
}

impl<T> From<&crate::error::Result<T>> for ActionOutcome
where
    T: TxHashed,
{
    fn from(result: &crate::error::Result<T>) -> Self {
        match result {
            Ok(value) => ActionOutcome::Success {
                tx_hash: value.tx_hash().map(|h| format!("{h:?}")),
            },
            Err(e) => ActionOutcome::from_error(e),
        }
    }
}

/// Action results that may carry a transaction hash.
pub trait TxHashed {
    fn tx_hash(&self) -> Option<H256>;
}

impl TxHashed for () {
    fn tx_hash(&self) -> Option<H256> {
        None
    }
}

impl TxHashed for Option<crate::connection::SwitchOutcome> {
    fn tx_hash(&self) -> Option<H256> {
        None
    }
}

impl TxHashed for H256 {
    fn tx_hash(&self) -> Option<H256> {
        Some(*self)
    }
}

/// Connection, network and balance state for one wallet session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    accounts: Vec<Address>,
    network: Option<NetworkStatus>,
    balances: Balances,
    pending: Option<PendingTransaction>,
    last_outcome: Option<ActionOutcome>,
}

impl Session {
    pub fn active_account(&self) -> Option<Address> {
        self.accounts.first().copied()
    }

    pub fn is_connected(&self) -> bool {
        !self.accounts.is_empty()
    }

    pub fn network(&self) -> NetworkStatus {
        self.network.unwrap_or_else(NetworkStatus::unknown)
    }

    pub fn transfers_enabled(&self) -> bool {
        self.is_connected() && self.network().on_right_network && self.pending.is_none()
    }

    pub fn balances(&self) -> Balances {
        self.balances
    }

    /// Replaces the account list. Losing every account also drops balances.
    pub fn set_accounts(&mut self, accounts: Vec<Address>) {
        if accounts.is_empty() {
            self.balances = Balances::default();
        }
        self.accounts = accounts;
    }

    pub fn network_checked(&mut self, status: NetworkStatus) {
        self.network = Some(status);
    }

    pub fn balances_refreshed(&mut self, balances: Balances) {
        self.balances = balances;
    }

    pub fn transfer_submitted(&mut self, kind: TransferKind, tx_hash: H256) {
        self.pending = Some(PendingTransaction {
            kind,
            tx_hash: format!("{tx_hash:?}"),
            submitted_at: Utc::now(),
        });
    }

    pub fn transfer_finished(&mut self) {
        self.pending = None;
    }

    pub fn record_outcome(&mut self, outcome: ActionOutcome) {
        self.last_outcome = Some(outcome);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let connected = self.is_connected();
        let network = self.network();
        SessionSnapshot {
            account: self
                .active_account()
                .map(|a| ethers::utils::to_checksum(&a, None)),
            connected,
            chain_id: network.chain_id,
            on_right_network: network.on_right_network,
            native_balance: self.balances.native,
            token_balance: self.balances.token,
            connect_button_text: if connected { "Connected" } else { "Connect" }.to_string(),
            connect_button_disabled: connected,
            transfers_enabled: self.transfers_enabled(),
            pending: self.pending.clone(),
            last_outcome: self.last_outcome.clone(),
        }
    }
}

/// Read-only view of a [`Session`] handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub account: Option<String>,
    pub connected: bool,
    pub chain_id: Option<u64>,
    pub on_right_network: bool,
    pub native_balance: Decimal,
    pub token_balance: Decimal,
    pub connect_button_text: String,
    pub connect_button_disabled: bool,
    pub transfers_enabled: bool,
    pub pending: Option<PendingTransaction>,
    pub last_outcome: Option<ActionOutcome>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Session::default().snapshot()
    }
}
