//! Centralized error types for Badge Wall.
//!
//! Every failure a session operation can hit ends up here: reducer misuse,
//! provider rejections, JSON-RPC errors from the node, and transport or
//! decoding problems. None of them are retried.

use crate::models::SessionStatus;

/// JSON-RPC error code a wallet returns when the user declines a request (EIP-1193).
pub const USER_REJECTED_REQUEST: i64 = 4001;

/// Core error type used across all Badge Wall crates.
#[derive(Debug, thiserror::Error)]
pub enum WallError {
    // === Store errors ===
    #[error("Unhandled action {action} while {status}")]
    UnhandledAction {
        action: &'static str,
        status: SessionStatus,
    },

    // === Provider errors ===
    #[error("No wallet provider is installed")]
    ProviderMissing,

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    // === Decoding errors ===
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    // === Infrastructure errors ===
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl WallError {
    /// True when the wallet reported that the user declined the request.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == USER_REJECTED_REQUEST)
    }

    /// Error code string for programmatic handling by the presentation layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnhandledAction { .. } => "UNHANDLED_ACTION",
            Self::ProviderMissing => "PROVIDER_MISSING",
            Self::Rpc { .. } if self.is_user_rejection() => "USER_REJECTED",
            Self::Rpc { .. } => "RPC_ERROR",
            Self::InvalidAddress(_) => "INVALID_ADDRESS",
            Self::Decode(_) | Self::Json(_) => "DECODE_ERROR",
            Self::Http(_) => "TRANSPORT_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Convenience type alias for Results using WallError.
pub type WallResult<T> = Result<T, WallError>;
