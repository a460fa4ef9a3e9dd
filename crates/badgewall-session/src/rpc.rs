//! Minimal async JSON-RPC 2.0 client over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use badgewall_common::error::{WallError, WallResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Async JSON-RPC client.
///
/// ```rust,no_run
/// use badgewall_session::rpc::RpcClient;
///
/// #[tokio::main]
/// async fn main() -> badgewall_common::error::WallResult<()> {
///     let rpc = RpcClient::new("http://localhost:8545")?;
///     let block: String = rpc.call("eth_blockNumber", serde_json::json!([])).await?;
///     println!("{block}");
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RpcClient {
    client: Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> WallResult<Self> {
        let client = Client::builder()
            .default_headers({
                let mut h = reqwest::header::HeaderMap::new();
                h.insert(
                    reqwest::header::CONTENT_TYPE,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                h
            })
            .build()
            .map_err(WallError::Http)?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` with positional `params` and decode the `result` member.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> WallResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        debug!(id, method, url = %self.url, "rpc request");

        let resp = self.client.post(&self.url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_else(|_| status.to_string());
            warn!(method, status = status.as_u16(), "rpc transport failure");
            return Err(WallError::Rpc {
                code: i64::from(status.as_u16()),
                message,
            });
        }

        let envelope: RpcResponse = resp.json().await?;
        if let Some(err) = envelope.error {
            debug!(id, method, code = err.code, "rpc error response");
            return Err(WallError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(serde_json::from_value(envelope.result)?)
    }
}
