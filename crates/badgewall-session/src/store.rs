//! Connection state store.
//!
//! [`apply`] is the only place a [`Session`] changes. [`SessionStore`] wraps it
//! in a `watch` channel so any number of consumers can follow the current value.

use badgewall_common::error::{WallError, WallResult};
use badgewall_common::models::{Action, Session, SessionStatus};
use tokio::sync::watch;
use tracing::debug;

/// Pure transition function: `(state, action) -> state'`.
///
/// `PageLoaded` is accepted once, before the session is idle. Anything else is
/// reported as [`WallError::UnhandledAction`].
pub fn apply(state: &Session, action: Action) -> WallResult<Session> {
    match action {
        Action::Loading => Ok(Session {
            status: SessionStatus::Loading,
            ..state.clone()
        }),
        Action::Connect {
            address,
            balance,
            intro_passed,
            advanced_passed,
        } => Ok(Session {
            status: SessionStatus::Idle,
            wallet_address: Some(address),
            balance: Some(balance),
            intro_badge_owned: intro_passed,
            advanced_badge_owned: advanced_passed,
            ..state.clone()
        }),
        Action::Disconnect => Ok(Session {
            wallet_address: None,
            balance: None,
            intro_badge_owned: false,
            advanced_badge_owned: false,
            ..state.clone()
        }),
        Action::PageLoaded { provider_installed } => {
            if state.provider_installed.is_some() || state.status == SessionStatus::Idle {
                return Err(WallError::UnhandledAction {
                    action: "PageLoaded",
                    status: state.status,
                });
            }
            Ok(Session {
                status: SessionStatus::Idle,
                provider_installed: Some(provider_installed),
                ..state.clone()
            })
        }
    }
}

/// Holds the current session and notifies subscribers on change.
#[derive(Clone)]
pub struct SessionStore {
    sender: watch::Sender<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_session(Session::default())
    }

    pub fn with_session(session: Session) -> Self {
        let (sender, _) = watch::channel(session);
        Self { sender }
    }

    /// Apply `action` to the current session.
    ///
    /// Subscribers are only woken when the session actually changed. On error
    /// the session is left untouched.
    pub fn dispatch(&self, action: Action) -> WallResult<Session> {
        let name = action.name();
        let mut outcome = Ok(());
        self.sender.send_if_modified(|current| match apply(current, action) {
            Ok(next) => {
                let changed = *current != next;
                *current = next;
                changed
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome?;

        let session = self.snapshot();
        debug!(action = name, status = %session.status, connected = session.is_connected(), "session dispatch");
        Ok(session)
    }

    /// Current session.
    pub fn snapshot(&self) -> Session {
        self.sender.borrow().clone()
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.sender.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
