use ethers::types::{Address, H256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::balance::BalanceReader;
use crate::config::Config;
use crate::connection::{ConnectionFlow, SwitchOutcome};
use crate::constants::{COMMAND_QUEUE_CAPACITY, RETURN_VAULT_ADDRESS, USDC_ADDRESS};
use crate::error::{AppError, Result};
use crate::network_guard::NetworkGuard;
use crate::session::{ActionOutcome, Session, SessionSnapshot};
use crate::transfer::{TransferExecutor, TransferKind};
use crate::wallet::{NetworkDefinition, WalletEvent, WalletProvider};

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    Connect(Reply<Option<SwitchOutcome>>),
    Refresh(Reply<()>),
    Transfer(TransferKind, Reply<H256>),
}

/// Cloneable front door to the controller task.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    async fn dispatch<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| AppError::Internal("session controller stopped".to_string()))?;
        rx.await
            .map_err(|_| AppError::Internal("session controller dropped the request".to_string()))?
    }

    /// Returns the network switch result, or `None` if already connected.
    pub async fn connect(&self) -> Result<Option<SwitchOutcome>> {
        self.dispatch(Command::Connect).await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.dispatch(Command::Refresh).await
    }

    pub async fn deposit(&self) -> Result<H256> {
        self.dispatch(|reply| Command::Transfer(TransferKind::Deposit, reply))
            .await
    }

    pub async fn withdraw(&self) -> Result<H256> {
        self.dispatch(|reply| Command::Transfer(TransferKind::Withdraw, reply))
            .await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}

/// Owns the [`Session`] and applies commands and wallet events one at a time.
pub struct SessionController {
    wallet: Arc<dyn WalletProvider>,
    session: Session,
    guard: NetworkGuard,
    connection: ConnectionFlow,
    reader: BalanceReader,
    transfers: TransferExecutor,
    snapshots: watch::Sender<SessionSnapshot>,
}

fn parse_address(name: &str, raw: &str) -> Result<Address> {
    raw.parse()
        .map_err(|e| AppError::Config(format!("Invalid {name} address {raw}: {e}")))
}

impl SessionController {
    pub fn new(config: &Config, wallet: Arc<dyn WalletProvider>) -> Result<Self> {
        let token = parse_address("token", USDC_ADDRESS)?;
        let vault = parse_address("vault", RETURN_VAULT_ADDRESS)?;
        let guard = NetworkGuard;
        let (snapshots, _) = watch::channel(SessionSnapshot::default());

        Ok(Self {
            wallet,
            session: Session::default(),
            guard,
            connection: ConnectionFlow::new(
                guard,
                NetworkDefinition::optimism(&config.network_rpc_url),
            ),
            reader: BalanceReader::new(token),
            transfers: TransferExecutor::new(
                vault,
                config.transfer_style,
                Duration::from_millis(config.receipt_poll_interval_ms),
                Duration::from_secs(config.receipt_timeout_secs),
            ),
            snapshots,
        })
    }

    pub fn spawn(self) -> SessionHandle {
        let (commands, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let handle = SessionHandle {
            commands,
            snapshots: self.snapshots.subscribe(),
        };
        let events = self.wallet.subscribe();
        tokio::spawn(self.run(rx, events));
        handle
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: broadcast::Receiver<WalletEvent>,
    ) {
        tracing::info!("Session controller started");
        let mut events_open = true;
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command).await;
                }
                event = events.recv(), if events_open => match event {
                    Ok(event) => self.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {} wallet notification(s), re-reading wallet state", skipped);
                        self.resync().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::warn!("Wallet notification stream closed");
                        events_open = false;
                    }
                },
            }
        }
        tracing::info!("Session controller stopped");
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect(reply) => {
                let result = self.connect().await;
                self.finish(&result);
                let _ = reply.send(result);
            }
            Command::Refresh(reply) => {
                let result = self.refresh().await;
                self.finish(&result);
                let _ = reply.send(result);
            }
            Command::Transfer(kind, reply) => {
                let result = self.transfer(kind).await;
                self.finish(&result);
                let _ = reply.send(result);
            }
        }
    }

    fn finish<T: crate::session::TxHashed>(&mut self, result: &Result<T>) {
        if let Err(e) = result {
            match e.severity() {
                crate::error::Severity::Recoverable => tracing::warn!("Action failed: {}", e),
                crate::error::Severity::Fatal => tracing::error!("Action failed: {}", e),
            }
        }
        self.session.record_outcome(ActionOutcome::from(result));
        self.publish();
    }

    async fn handle_event(&mut self, event: WalletEvent) {
        match event {
            WalletEvent::ChainChanged(chain) => {
                tracing::info!("Wallet switched chain to {}", chain);
                self.check_network().await;
            }
            WalletEvent::AccountsChanged(accounts) => {
                tracing::info!("Wallet accounts changed ({} account(s))", accounts.len());
                self.apply_accounts(accounts).await;
            }
        }
    }

    async fn resync(&mut self) {
        self.check_network().await;
        if self.session.is_connected() {
            match crate::wallet::methods::accounts(self.wallet.as_ref()).await {
                Ok(accounts) => self.apply_accounts(accounts).await,
                Err(e) => tracing::warn!("Could not re-read wallet accounts: {}", e),
            }
        }
    }

    async fn check_network(&mut self) {
        let status = self.guard.check(self.wallet.as_ref()).await;
        self.session.network_checked(status);
        self.publish();
    }

    async fn apply_accounts(&mut self, accounts: Vec<Address>) {
        self.session.set_accounts(accounts);
        self.publish();
        if self.session.is_connected() {
            self.check_network().await;
            if let Err(e) = self.refresh().await {
                tracing::warn!("Balance refresh after account change failed: {}", e);
            }
        }
    }

    async fn connect(&mut self) -> Result<Option<SwitchOutcome>> {
        if self.session.is_connected() {
            tracing::debug!("Connect requested while already connected");
            return Ok(None);
        }

        let report = self.connection.connect(self.wallet.as_ref()).await?;
        tracing::info!("Connected; network switch: {:?}", report.switch);
        self.session.set_accounts(report.accounts);
        self.session.network_checked(report.network);
        self.publish();

        if let Err(e) = self.refresh().await {
            tracing::warn!("Balance refresh after connect failed: {}", e);
        }
        Ok(Some(report.switch))
    }

    /// Re-reads balances; on failure the previous values stay on display.
    async fn refresh(&mut self) -> Result<()> {
        let Some(account) = self.session.active_account() else {
            return Ok(());
        };
        let balances = self
            .reader
            .read(self.wallet.as_ref(), account)
            .await
            .map_err(|e| match e {
                AppError::Conversion(_) => e,
                other => AppError::BalanceUnavailable(other.to_string()),
            })?;
        self.session.balances_refreshed(balances);
        self.publish();
        Ok(())
    }

    async fn transfer(&mut self, kind: TransferKind) -> Result<H256> {
        // Gate on fresh state: the wallet may have moved since the last snapshot.
        let status = self.guard.check(self.wallet.as_ref()).await;
        self.session.network_checked(status);
        self.guard
            .ensure_transfer_allowed(self.session.is_connected(), status)?;
        let account = self.session.active_account().ok_or(AppError::NotConnected)?;

        let tx_hash = self
            .transfers
            .submit(self.wallet.as_ref(), kind, account)
            .await?;
        self.session.transfer_submitted(kind, tx_hash);
        self.publish();

        let confirmation = self
            .transfers
            .wait_for_confirmation(self.wallet.as_ref(), tx_hash)
            .await;
        self.session.transfer_finished();
        self.publish();
        confirmation?;

        if let Err(e) = self.refresh().await {
            tracing::warn!("Balance refresh after {:?} failed: {}", kind, e);
        }
        Ok(tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::wallet::scripted::ScriptedWallet;
    use ethers::abi::Token;
    use ethers::types::U256;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;

    const ACCOUNT: &str = "0x1000000000000000000000000000000000000001";
    const OTHER: &str = "0x2000000000000000000000000000000000000002";

    fn token_word(value: u64) -> String {
        format!(
            "0x{}",
            hex::encode(ethers::abi::encode(&[Token::Uint(U256::from(value))]))
        )
    }

    fn happy_wallet() -> Arc<ScriptedWallet> {
        let wallet = Arc::new(ScriptedWallet::new());
        wallet.respond("eth_requestAccounts", Ok(json!([ACCOUNT])));
        wallet.respond("wallet_switchEthereumChain", Ok(json!(null)));
        wallet.respond("eth_chainId", Ok(json!("0xa")));
        wallet.respond("eth_getBalance", Ok(json!("0x2386f26fc10000")));
        wallet.respond("eth_call", Ok(json!(token_word(5_053_000))));
        wallet.respond(
            "eth_sendTransaction",
            Ok(json!(H256::repeat_byte(0x22))),
        );
        wallet.respond(
            "eth_getTransactionReceipt",
            Ok(json!({
                "transactionHash": H256::repeat_byte(0x22),
                "blockNumber": "0x1",
                "status": "0x1"
            })),
        );
        wallet
    }

    fn controller(wallet: Arc<ScriptedWallet>) -> SessionController {
        SessionController::new(&test_config(), wallet).unwrap()
    }

    #[tokio::test]
    async fn connect_populates_session_and_balances() {
        let wallet = happy_wallet();
        let mut controller = controller(wallet.clone());

        controller.connect().await.unwrap();

        let snapshot = controller.session.snapshot();
        assert!(snapshot.connected);
        assert!(snapshot.on_right_network);
        assert!(snapshot.transfers_enabled);
        assert_eq!(snapshot.native_balance, Decimal::from_str("0.01").unwrap());
        assert_eq!(snapshot.token_balance, Decimal::from_str("5.05").unwrap());
    }

    #[tokio::test]
    async fn denied_connect_leaves_session_empty() {
        let wallet = Arc::new(ScriptedWallet::new());
        wallet.respond(
            "eth_requestAccounts",
            Err(AppError::from_rpc(4001, "User rejected the request.")),
        );
        let mut controller = controller(wallet);

        let result = controller.connect().await;

        assert!(matches!(result, Err(AppError::UserRejected(_))));
        assert!(!controller.session.is_connected());
        assert!(controller.session.active_account().is_none());
    }

    #[tokio::test]
    async fn second_connect_is_a_no_op() {
        let wallet = happy_wallet();
        let mut controller = controller(wallet.clone());
        assert_eq!(
            controller.connect().await.unwrap(),
            Some(SwitchOutcome::Switched)
        );
        assert_eq!(controller.connect().await.unwrap(), None);
        assert_eq!(wallet.calls_to("eth_requestAccounts").len(), 1);
    }

    #[tokio::test]
    async fn refresh_without_account_does_nothing() {
        let wallet = happy_wallet();
        let mut controller = controller(wallet.clone());
        controller.refresh().await.unwrap();
        assert!(wallet.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_balances() {
        let wallet = happy_wallet();
        let mut controller = controller(wallet.clone());
        controller.connect().await.unwrap();
        let before = controller.session.balances();

        wallet.respond("eth_call", Ok(json!("0x01")));
        let result = controller.refresh().await;

        assert!(matches!(result, Err(AppError::Conversion(_))));
        assert_eq!(controller.session.balances(), before);
    }

    #[tokio::test]
    async fn unreachable_node_during_refresh_is_recoverable() {
        let wallet = happy_wallet();
        let mut controller = controller(wallet.clone());
        controller.connect().await.unwrap();

        wallet.respond("eth_getBalance", Err(AppError::Transport("node down".into())));
        let result = controller.refresh().await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::BalanceUnavailable(_)));
        assert_eq!(err.severity(), crate::error::Severity::Recoverable);
        assert_eq!(
            controller.session.balances().token,
            Decimal::from_str("5.05").unwrap()
        );
    }

    #[tokio::test]
    async fn transfer_rechecks_network_at_submission() {
        let wallet = happy_wallet();
        let mut controller = controller(wallet.clone());
        controller.connect().await.unwrap();

        wallet.respond("eth_chainId", Ok(json!("0x1")));
        let result = controller.transfer(TransferKind::Deposit).await;

        assert!(matches!(
            result,
            Err(AppError::WrongNetwork {
                expected: 10,
                actual: Some(1)
            })
        ));
        assert!(wallet.calls_to("eth_sendTransaction").is_empty());
        assert!(!controller.session.snapshot().transfers_enabled);
    }

    #[tokio::test]
    async fn transfer_requires_connection() {
        let wallet = happy_wallet();
        let mut controller = controller(wallet.clone());
        let result = controller.transfer(TransferKind::Withdraw).await;
        assert!(matches!(result, Err(AppError::NotConnected)));
        assert!(wallet.calls_to("eth_sendTransaction").is_empty());
    }

    #[tokio::test]
    async fn deposit_waits_for_receipt_then_refreshes() {
        let wallet = happy_wallet();
        let mut controller = controller(wallet.clone());
        controller.connect().await.unwrap();
        wallet.respond("eth_call", Ok(json!(token_word(17_053_000))));

        let tx_hash = controller.transfer(TransferKind::Deposit).await.unwrap();

        assert_eq!(tx_hash, H256::repeat_byte(0x22));
        let calls = wallet.calls();
        let sent = calls.iter().position(|m| m == "eth_sendTransaction").unwrap();
        let mined = calls
            .iter()
            .position(|m| m == "eth_getTransactionReceipt")
            .unwrap();
        let refreshed = calls.iter().rposition(|m| m == "eth_call").unwrap();
        assert!(sent < mined && mined < refreshed);
        assert_eq!(
            controller.session.balances().token,
            Decimal::from_str("17.05").unwrap()
        );
        assert!(controller.session.snapshot().pending.is_none());
    }

    #[tokio::test]
    async fn accounts_changed_event_replaces_account() {
        let wallet = happy_wallet();
        let mut controller = controller(wallet.clone());
        controller.connect().await.unwrap();

        let other: Address = OTHER.parse().unwrap();
        controller
            .handle_event(WalletEvent::AccountsChanged(vec![other]))
            .await;
        assert_eq!(controller.session.active_account(), Some(other));

        controller
            .handle_event(WalletEvent::AccountsChanged(Vec::new()))
            .await;
        assert!(!controller.session.is_connected());
        assert_eq!(controller.session.snapshot().connect_button_text, "Connect");
    }

    #[tokio::test]
    async fn chain_changed_event_reruns_guard() {
        let wallet = happy_wallet();
        let mut controller = controller(wallet.clone());
        controller.connect().await.unwrap();

        wallet.respond("eth_chainId", Ok(json!("0x89")));
        controller
            .handle_event(WalletEvent::ChainChanged("0x89".into()))
            .await;

        let snapshot = controller.session.snapshot();
        assert_eq!(snapshot.chain_id, Some(137));
        assert!(!snapshot.on_right_network);
        assert!(!snapshot.transfers_enabled);
    }

    #[tokio::test]
    async fn spawned_controller_serves_handle_and_events() {
        let wallet = happy_wallet();
        let handle = controller(wallet.clone()).spawn();

        handle.connect().await.unwrap();
        assert!(handle.snapshot().connected);

        let mut updates = handle.watch();
        wallet.respond("eth_chainId", Ok(json!("0x1")));
        assert_eq!(wallet.notify(WalletEvent::ChainChanged("0x1".into())), 1);
        updates
            .wait_for(|snapshot| !snapshot.on_right_network)
            .await
            .unwrap();

        let result = handle.withdraw().await;
        assert!(matches!(result, Err(AppError::WrongNetwork { .. })));
        assert!(matches!(
            handle.snapshot().last_outcome,
            Some(ActionOutcome::Recoverable { .. })
        ));
    }
}
