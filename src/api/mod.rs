// src/api/mod.rs

pub mod health;
pub mod session;
pub mod wallet_events;

use std::sync::Arc;

use crate::config::Config;
use crate::controller::SessionHandle;
use crate::wallet::WalletProvider;

#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
    pub wallet: Arc<dyn WalletProvider>,
    pub config: Config,
}
