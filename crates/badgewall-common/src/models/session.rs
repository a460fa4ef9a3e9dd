//! Session model — the in-memory record of the connected wallet.
//!
//! Nothing here is persisted. A session starts at [`Session::default`] when the
//! process starts and is only ever replaced through the store's transitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse loading state shown by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The environment probe has not completed yet
    #[default]
    NotLoaded,
    /// A wallet request is in flight
    Loading,
    /// Nothing in flight
    Idle,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotLoaded => "not_loaded",
            Self::Loading => "loading",
            Self::Idle => "idle",
        })
    }
}

/// Wallet session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub status: SessionStatus,

    /// Connected account; `None` while disconnected
    pub wallet_address: Option<String>,

    /// Native balance exactly as the provider returned it (hex quantity)
    pub balance: Option<String>,

    /// Result of the environment probe; `None` until `PageLoaded` is applied
    pub provider_installed: Option<bool>,

    pub intro_badge_owned: bool,
    pub advanced_badge_owned: bool,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        self.wallet_address.is_some()
    }

    /// Whether a wallet provider was detected. False until the probe completes.
    pub fn is_provider_installed(&self) -> bool {
        self.provider_installed.unwrap_or(false)
    }

    pub fn is_page_loaded(&self) -> bool {
        self.status != SessionStatus::NotLoaded
    }
}
