//! Actions accepted by the session store.

use serde::{Deserialize, Serialize};

/// The closed set of session transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Loading,
    Connect {
        address: String,
        balance: String,
        intro_passed: bool,
        advanced_passed: bool,
    },
    Disconnect,
    PageLoaded { provider_installed: bool },
}

impl Action {
    /// Short action name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Connect { .. } => "Connect",
            Self::Disconnect => "Disconnect",
            Self::PageLoaded { .. } => "PageLoaded",
        }
    }
}
