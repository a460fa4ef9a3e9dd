//! In-process fakes for the wallet, the pass contract and a JSON-RPC node.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use badgewall_common::error::{WallError, WallResult};
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::contract::BadgeContract;
use crate::provider::{BlockTag, WalletProvider};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("badgewall=debug")
        .with_test_writer()
        .try_init();
}

/// Poll `cond` until it holds, failing the test after a few seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// ── Wallet ───────────────────────────────────────────────────────────────────

pub struct FakeProvider {
    pub accounts: Mutex<WallResult<Vec<String>>>,
    pub balances: Mutex<HashMap<String, String>>,
    pub metamask: bool,
    pub removals: AtomicUsize,
    sender: broadcast::Sender<Vec<String>>,
}

impl FakeProvider {
    pub fn new(accounts: &[&str]) -> Arc<Self> {
        let (sender, _) = broadcast::channel(16);
        Arc::new(Self {
            accounts: Mutex::new(Ok(accounts.iter().map(|a| a.to_string()).collect())),
            balances: Mutex::new(HashMap::new()),
            metamask: true,
            removals: AtomicUsize::new(0),
            sender,
        })
    }

    pub fn with_balance(self: Arc<Self>, address: &str, balance: &str) -> Arc<Self> {
        self.balances.lock().unwrap().insert(address.into(), balance.into());
        self
    }

    pub fn reject_with(&self, code: i64) {
        *self.accounts.lock().unwrap() = Err(WallError::Rpc { code, message: "rejected".into() });
    }

    /// Push an `accountsChanged` notification to every registered listener.
    pub fn emit(&self, accounts: &[&str]) {
        let _ = self.sender.send(accounts.iter().map(|a| a.to_string()).collect());
    }

    pub fn listeners(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for FakeProvider {
    async fn request_accounts(&self) -> WallResult<Vec<String>> {
        match &*self.accounts.lock().unwrap() {
            Ok(accounts) => Ok(accounts.clone()),
            Err(WallError::Rpc { code, message }) => Err(WallError::Rpc { code: *code, message: message.clone() }),
            Err(other) => Err(WallError::Decode(other.to_string())),
        }
    }

    async fn get_balance(&self, address: &str, block: &BlockTag) -> WallResult<String> {
        assert_eq!(*block, BlockTag::Latest);
        self.balances
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| WallError::Rpc { code: -32000, message: format!("no balance for {address}") })
    }

    fn accounts_changed(&self) -> broadcast::Receiver<Vec<String>> {
        self.sender.subscribe()
    }

    fn remove_account_listeners(&self) {
        self.removals.fetch_add(1, Ordering::SeqCst);
    }

    fn is_metamask(&self) -> bool {
        self.metamask
    }
}

// ── Pass contract ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeContract {
    pub balances: Mutex<HashMap<(String, u64), u64>>,
    pub fail: Mutex<bool>,
    pub calls: AtomicUsize,
}

impl FakeContract {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn holding(self: Arc<Self>, owner: &str, token_id: u64, amount: u64) -> Arc<Self> {
        self.balances.lock().unwrap().insert((owner.into(), token_id), amount);
        self
    }

    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl BadgeContract for FakeContract {
    async fn balance_of(&self, owner: &str, token_id: u64) -> WallResult<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail.lock().unwrap() {
            return Err(WallError::Rpc { code: -32603, message: "execution reverted".into() });
        }
        let amount = self
            .balances
            .lock()
            .unwrap()
            .get(&(owner.to_owned(), token_id))
            .copied()
            .unwrap_or(0);
        Ok(U256::from(amount))
    }
}

// ── JSON-RPC node ────────────────────────────────────────────────────────────

type Handler = dyn Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync;

#[derive(Clone)]
struct NodeState {
    handler: Arc<Handler>,
    ids: Arc<Mutex<Vec<u64>>>,
}

/// A JSON-RPC node served by axum on a random local port.
pub struct FakeNode {
    url: String,
    ids: Arc<Mutex<Vec<u64>>>,
    server: tokio::task::JoinHandle<()>,
}

impl FakeNode {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync + 'static,
    {
        let state = NodeState {
            handler: Arc::new(handler),
            ids: Arc::new(Mutex::new(Vec::new())),
        };
        let ids = Arc::clone(&state.ids);
        let app = Router::new().route("/", post(serve)).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { url: format!("http://{addr}/"), ids, server }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn seen_ids(&self) -> Vec<u64> {
        self.ids.lock().unwrap().clone()
    }
}

impl Drop for FakeNode {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn serve(State(state): State<NodeState>, Json(req): Json<Value>) -> Json<Value> {
    let id = req["id"].as_u64().unwrap_or_default();
    state.ids.lock().unwrap().push(id);
    let method = req["method"].as_str().unwrap_or_default();
    let params = req.get("params").cloned().unwrap_or(Value::Null);
    Json(match (state.handler)(method, &params) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => {
            json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
        }
    })
}
