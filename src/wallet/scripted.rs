use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::broadcast;

use super::{WalletEvent, WalletProvider};
use crate::error::{AppError, Result};

type Reply = Result<serde_json::Value>;

/// In-memory wallet that answers from a script and records every request.
pub struct ScriptedWallet {
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    sticky: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
    events: broadcast::Sender<WalletEvent>,
}

impl ScriptedWallet {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            queued: Mutex::new(HashMap::new()),
            sticky: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Answer every call to `method` with `reply` once queued replies run out.
    pub fn respond(&self, method: &str, reply: Reply) {
        self.sticky
            .lock()
            .unwrap()
            .insert(method.to_string(), reply);
    }

    /// Answer the next call to `method` with `reply`.
    pub fn respond_once(&self, method: &str, reply: Reply) {
        self.queued
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    pub fn calls_to(&self, method: &str) -> Vec<serde_json::Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

#[async_trait]
impl WalletProvider for ScriptedWallet {
    async fn request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        if let Some(reply) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return reply;
        }

        self.sticky
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or_else(|| {
                Err(AppError::Wallet {
                    code: -32601,
                    message: format!("{method} not scripted"),
                })
            })
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: WalletEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }
}
