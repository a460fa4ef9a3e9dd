//! Session synchronizer — drives the store from the wallet and the pass contract.
//!
//! The synchronizer owns at most one account-change subscription at a time.
//! It is acquired after the first successful connect and released when the
//! session disconnects, when [`SessionSync::shutdown`] is called, or when the
//! last handle is dropped.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use badgewall_common::badge::Badge;
use badgewall_common::error::{WallError, WallResult};
use badgewall_common::models::{Action, Session};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::contract::{is_owned, BadgeContract};
use crate::provider::{BlockTag, WalletProvider};
use crate::store::SessionStore;

/// Owned account-change listener. Dropping it stops the listener task and
/// removes the provider's account listeners.
pub struct AccountSubscription {
    task: JoinHandle<()>,
    provider: Arc<dyn WalletProvider>,
}

impl Drop for AccountSubscription {
    fn drop(&mut self) {
        self.task.abort();
        self.provider.remove_account_listeners();
        debug!("sync: account subscription released");
    }
}

struct Inner {
    store: SessionStore,
    provider: Option<Arc<dyn WalletProvider>>,
    contract: Arc<dyn BadgeContract>,
    subscription: Mutex<Option<AccountSubscription>>,
}

impl Inner {
    fn provider(&self) -> WallResult<&Arc<dyn WalletProvider>> {
        self.provider.as_ref().ok_or(WallError::ProviderMissing)
    }

    /// Apply `action`, then run its side effects.
    fn dispatch(&self, action: Action) -> WallResult<Session> {
        let disconnect = matches!(action, Action::Disconnect);
        let session = self.store.dispatch(action)?;
        if disconnect {
            self.release_subscription();
        }
        Ok(session)
    }

    fn release_subscription(&self) {
        let released = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        // Drop outside the lock; the listener task may be the caller.
        drop(released);
    }

    /// Look up the native balance and both badges for `address`, then dispatch `Connect`.
    async fn refresh_for(&self, address: &str) -> WallResult<Session> {
        let provider = self.provider()?;
        let (balance, intro, advanced) = tokio::try_join!(
            provider.get_balance(address, &BlockTag::Latest),
            self.contract.balance_of(address, Badge::Intro.token_id()),
            self.contract.balance_of(address, Badge::Advanced.token_id()),
        )?;

        let intro_passed = is_owned(intro);
        let advanced_passed = is_owned(advanced);
        debug!(address, %balance, intro_passed, advanced_passed, "sync: session refreshed");
        self.dispatch(Action::Connect {
            address: address.to_owned(),
            balance,
            intro_passed,
            advanced_passed,
        })
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.release_subscription();
    }
}

/// Bridges the wallet provider and the pass contract into a [`SessionStore`].
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use badgewall_common::config;
/// use badgewall_session::{RpcBadgeContract, RpcWalletProvider, SessionStore, SessionSync};
///
/// #[tokio::main]
/// async fn main() -> badgewall_common::error::WallResult<()> {
///     let cfg = config::init()?;
///     let provider = RpcWalletProvider::from_config(&cfg.provider)?
///         .map(|p| Arc::new(p) as Arc<dyn badgewall_session::WalletProvider>);
///     let contract = Arc::new(RpcBadgeContract::from_config(cfg)?);
///
///     let sync = SessionSync::new(SessionStore::new(), provider, contract);
///     sync.init()?;
///     if let Some(session) = sync.connect().await? {
///         println!("connected: {:?}", session.wallet_address);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct SessionSync {
    inner: Arc<Inner>,
}

impl SessionSync {
    pub fn new(
        store: SessionStore,
        provider: Option<Arc<dyn WalletProvider>>,
        contract: Arc<dyn BadgeContract>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                provider,
                contract,
                subscription: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    /// Environment probe. Records whether a wallet of the expected brand is present.
    pub fn init(&self) -> WallResult<Session> {
        let installed = self.inner.provider.as_ref().is_some_and(|p| p.is_metamask());
        info!(installed, "sync: environment probed");
        self.inner.dispatch(Action::PageLoaded {
            provider_installed: installed,
        })
    }

    /// Ask the wallet for its accounts and load the first one into the session.
    ///
    /// Returns `None` without touching the session when the wallet reports no
    /// accounts. Any failure propagates; a failed lookup leaves the session in
    /// `Loading`.
    pub async fn connect(&self) -> WallResult<Option<Session>> {
        let provider = self.inner.provider()?;
        let accounts = provider
            .request_accounts()
            .await
            .inspect_err(|e| warn!(code = e.error_code(), "sync: account request failed: {e}"))?;

        let Some(address) = accounts.first() else {
            debug!("sync: wallet returned no accounts");
            return Ok(None);
        };

        self.inner.dispatch(Action::Loading)?;
        let session = self
            .inner
            .refresh_for(address)
            .await
            .inspect_err(|e| warn!(address = %address, "sync: lookup failed: {e}"))?;
        self.listen_for_account_change()?;
        info!(address = %address, "sync: connected");
        Ok(Some(session))
    }

    /// Re-run the balance and badge lookup for `address`.
    pub async fn refresh_for(&self, address: &str) -> WallResult<Session> {
        self.inner.refresh_for(address).await
    }

    /// Register the account-change listener unless one is already active.
    ///
    /// Returns `true` when a new subscription was created.
    pub fn listen_for_account_change(&self) -> WallResult<bool> {
        let provider = Arc::clone(self.inner.provider()?);
        let mut slot = self
            .inner
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            debug!("sync: already listening for account changes");
            return Ok(false);
        }

        let mut rx = provider.accounts_changed();
        let inner = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            loop {
                let accounts = match rx.recv().await {
                    Ok(accounts) => accounts,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "sync: account notifications lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if !on_accounts_changed(&inner, accounts).await {
                    break;
                }
            }
        });

        *slot = Some(AccountSubscription { task, provider });
        info!("sync: listening for account changes");
        Ok(true)
    }

    /// Whether an account-change subscription is currently held.
    pub fn is_listening(&self) -> bool {
        self.inner
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Apply `action` through the store and run its side effects.
    pub fn dispatch(&self, action: Action) -> WallResult<Session> {
        self.inner.dispatch(action)
    }

    /// Clear the session and release the account-change subscription.
    pub fn disconnect(&self) -> WallResult<Session> {
        info!("sync: disconnect");
        self.inner.dispatch(Action::Disconnect)
    }

    /// Release the account-change subscription without touching the session.
    pub fn shutdown(&self) {
        self.inner.release_subscription();
    }
}

/// Handle one `accountsChanged` notification. Returns `false` once the listener should stop.
async fn on_accounts_changed(inner: &Weak<Inner>, accounts: Vec<String>) -> bool {
    let Some(inner) = inner.upgrade() else {
        return false;
    };
    match accounts.first() {
        Some(address) => {
            debug!(address = %address, "sync: account changed");
            if let Err(e) = inner.refresh_for(address).await {
                warn!(address = %address, "sync: refresh after account change failed: {e}");
            }
            true
        }
        None => {
            info!("sync: wallet disconnected");
            if let Err(e) = inner.dispatch(Action::Disconnect) {
                warn!("sync: disconnect failed: {e}");
            }
            false
        }
    }
}
