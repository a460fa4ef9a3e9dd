//! Wallet session state for the Badge Wall.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use badgewall_session::{
//!     RpcBadgeContract, RpcClient, RpcWalletProvider, SessionStore, SessionSync, WallView, WalletProvider,
//! };
//! use badgewall_session::provider::BlockTag;
//!
//! #[tokio::main]
//! async fn main() -> badgewall_common::error::WallResult<()> {
//!     let wallet: Arc<dyn WalletProvider> = Arc::new(RpcWalletProvider::new(
//!         RpcClient::new("http://localhost:1248")?,
//!         std::time::Duration::from_secs(4),
//!         true,
//!     ));
//!     let contract = RpcBadgeContract::new(
//!         RpcClient::new("http://localhost:8545")?,
//!         badgewall_common::config::DEFAULT_CONTRACT_ADDRESS,
//!         BlockTag::Latest,
//!     )?;
//!
//!     let sync = SessionSync::new(SessionStore::new(), Some(wallet), Arc::new(contract));
//!     sync.init()?;
//!     sync.connect().await?;
//!
//!     // Re-render whenever the session changes.
//!     let mut changes = sync.store().subscribe();
//!     while changes.changed().await.is_ok() {
//!         let view = WallView::from_session(&changes.borrow_and_update());
//!         println!("{view:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod contract;
pub mod provider;
pub mod rpc;
pub mod store;
pub mod sync;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use contract::{BadgeContract, RpcBadgeContract};
pub use provider::{RpcWalletProvider, WalletProvider};
pub use rpc::RpcClient;
pub use store::{apply, SessionStore};
pub use sync::{AccountSubscription, SessionSync};
pub use view::WallView;
