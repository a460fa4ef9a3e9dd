//! Configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for deployments.
//! Config precedence: env vars > .env file > badgewall.toml > defaults

use std::sync::OnceLock;
use std::time::Duration;

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use url::Url;

use crate::error::{WallError, WallResult};

/// Pass contract deployed for the course badges.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xDF9C19ceAdf7e4A9db07A57Fc0bFA246938e3BCA";

static CONFIG: OnceLock<WallConfig> = OnceLock::new();

/// Get the global configuration, if [`init`] has run.
pub fn get() -> Option<&'static WallConfig> {
    CONFIG.get()
}

/// Initialize the global configuration from the environment.
///
/// Should be called once at startup. Later calls return the first value.
pub fn init() -> WallResult<&'static WallConfig> {
    if let Some(cfg) = CONFIG.get() {
        return Ok(cfg);
    }
    let cfg = WallConfig::load()?;
    Ok(CONFIG.get_or_init(|| cfg))
}

#[derive(Debug, Deserialize, Clone)]
pub struct WallConfig {
    pub rpc: RpcConfig,
    pub contract: ContractConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RpcConfig {
    /// JSON-RPC endpoint used for read-only contract calls
    pub url: String,
    /// Block tag passed to `eth_getBalance` and `eth_call`
    pub block_tag: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContractConfig {
    /// Address of the ERC-1155 pass contract
    pub address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Wallet JSON-RPC endpoint. Unset means no wallet provider is available.
    pub url: Option<String>,
    /// How often the HTTP provider polls `eth_accounts` for account changes
    pub poll_interval_ms: u64,
    /// Reported by the provider's brand check during the environment probe
    pub metamask: bool,
}

impl ProviderConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl WallConfig {
    /// Load configuration from defaults, `badgewall.toml`, `.env` and `BADGEWALL__*` variables.
    pub fn load() -> WallResult<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let builder = Self::defaults()?
            // Optional config file
            .add_source(config::File::with_name("badgewall").required(false))
            // Environment variables (BADGEWALL__RPC__URL, BADGEWALL__CONTRACT__ADDRESS, etc.)
            .add_source(
                config::Environment::with_prefix("BADGEWALL")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::from_builder(builder)
    }

    fn defaults() -> WallResult<ConfigBuilder<DefaultState>> {
        Ok(config::Config::builder()
            .set_default("rpc.url", "http://localhost:8545")?
            .set_default("rpc.block_tag", "latest")?
            .set_default("contract.address", DEFAULT_CONTRACT_ADDRESS)?
            .set_default("provider.poll_interval_ms", 4000)?
            .set_default("provider.metamask", true)?)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> WallResult<Self> {
        let cfg: WallConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        tracing::debug!(rpc = %cfg.rpc.url, contract = %cfg.contract.address, "configuration loaded");
        Ok(cfg)
    }

    fn validate(&self) -> WallResult<()> {
        let urls = std::iter::once(&self.rpc.url).chain(self.provider.url.as_ref());
        for raw in urls {
            Url::parse(raw).map_err(|e| {
                WallError::Config(config::ConfigError::Message(format!("invalid url {raw}: {e}")))
            })?;
        }
        if self.provider.poll_interval_ms == 0 {
            return Err(WallError::Config(config::ConfigError::Message(
                "provider.poll_interval_ms must be positive".into(),
            )));
        }
        Ok(())
    }
}
