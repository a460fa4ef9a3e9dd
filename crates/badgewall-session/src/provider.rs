//! Wallet provider capability and its JSON-RPC backed implementation.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use badgewall_common::config::ProviderConfig;
use badgewall_common::error::WallResult;
use serde_json::json;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::rpc::RpcClient;

/// Block selector for balance and call queries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlockTag {
    #[default]
    Latest,
    Pending,
    Earliest,
    Number(u64),
}

impl BlockTag {
    /// Parse the textual form used in configuration (`latest`, `pending`, `earliest`, `0x..`, or decimal).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "latest" => Some(Self::Latest),
            "pending" => Some(Self::Pending),
            "earliest" => Some(Self::Earliest),
            quantity if quantity.starts_with("0x") => {
                u64::from_str_radix(&quantity[2..], 16).ok().map(Self::Number)
            }
            dec => dec.parse().ok().map(Self::Number),
        }
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Pending => f.write_str("pending"),
            Self::Earliest => f.write_str("earliest"),
            Self::Number(n) => write!(f, "{n:#x}"),
        }
    }
}

/// The wallet the user connects with.
///
/// Account-change notifications are delivered over a broadcast channel; every
/// call to [`accounts_changed`](Self::accounts_changed) registers one more
/// listener until [`remove_account_listeners`](Self::remove_account_listeners)
/// drops them all.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for the user's accounts. The user may decline.
    async fn request_accounts(&self) -> WallResult<Vec<String>>;

    /// Native balance of `address`, as the wallet encodes it.
    async fn get_balance(&self, address: &str, block: &BlockTag) -> WallResult<String>;

    /// Register a listener for account-list changes.
    fn accounts_changed(&self) -> broadcast::Receiver<Vec<String>>;

    /// Drop every account-change listener.
    fn remove_account_listeners(&self);

    /// Brand check used by the environment probe.
    fn is_metamask(&self) -> bool;
}

/// A wallet reachable over HTTP JSON-RPC.
///
/// Account changes are detected by polling `eth_accounts` while at least one
/// listener is registered.
pub struct RpcWalletProvider {
    rpc: RpcClient,
    poll_interval: Duration,
    metamask: bool,
    sender: broadcast::Sender<Vec<String>>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl RpcWalletProvider {
    pub fn new(rpc: RpcClient, poll_interval: Duration, metamask: bool) -> Self {
        let (sender, _) = broadcast::channel(16);
        Self {
            rpc,
            poll_interval,
            metamask,
            sender,
            poller: Mutex::new(None),
        }
    }

    /// Build a provider from configuration. `None` when no wallet endpoint is configured.
    pub fn from_config(cfg: &ProviderConfig) -> WallResult<Option<Self>> {
        let Some(url) = cfg.url.as_deref() else {
            return Ok(None);
        };
        Ok(Some(Self::new(RpcClient::new(url)?, cfg.poll_interval(), cfg.metamask)))
    }

    fn ensure_poller(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if poller.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let rpc = self.rpc.clone();
        let tx = self.sender.clone();
        let interval = self.poll_interval;
        info!(url = rpc.url(), ?interval, "provider: watching accounts");

        *poller = Some(tokio::spawn(async move {
            let mut last: Option<Vec<String>> = None;
            loop {
                match rpc.call::<Vec<String>>("eth_accounts", json!([])).await {
                    Ok(accounts) => {
                        if last.as_ref().is_some_and(|prev| *prev != accounts) {
                            debug!(count = accounts.len(), "provider: accounts changed");
                            if tx.send(accounts.clone()).is_err() {
                                break;
                            }
                        }
                        last = Some(accounts);
                    }
                    Err(e) => warn!("provider: eth_accounts failed: {e}"),
                }
                sleep(interval).await;
            }
        }));
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> WallResult<Vec<String>> {
        self.rpc.call("eth_requestAccounts", json!([])).await
    }

    async fn get_balance(&self, address: &str, block: &BlockTag) -> WallResult<String> {
        self.rpc
            .call("eth_getBalance", json!([address, block.to_string()]))
            .await
    }

    fn accounts_changed(&self) -> broadcast::Receiver<Vec<String>> {
        let rx = self.sender.subscribe();
        self.ensure_poller();
        rx
    }

    fn remove_account_listeners(&self) {
        if let Some(handle) = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
            debug!("provider: account listeners removed");
        }
    }

    fn is_metamask(&self) -> bool {
        self.metamask
    }
}

impl Drop for RpcWalletProvider {
    fn drop(&mut self) {
        self.remove_account_listeners();
    }
}
