//! Read-only access to the pass contract.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use badgewall_common::config::WallConfig;
use badgewall_common::error::{WallError, WallResult};
use serde_json::json;
use tracing::debug;

use crate::provider::BlockTag;
use crate::rpc::RpcClient;

sol! {
    function balanceOf(address account, uint256 id) external view returns (uint256 balance);
}

/// A contract that can report per-token balances.
#[async_trait]
pub trait BadgeContract: Send + Sync {
    async fn balance_of(&self, owner: &str, token_id: u64) -> WallResult<U256>;
}

/// A badge is held when its token balance is positive.
pub fn is_owned(balance: U256) -> bool {
    !balance.is_zero()
}

/// ERC-1155 `balanceOf` over `eth_call`.
pub struct RpcBadgeContract {
    rpc: RpcClient,
    address: Address,
    block: BlockTag,
}

impl RpcBadgeContract {
    pub fn new(rpc: RpcClient, address: &str, block: BlockTag) -> WallResult<Self> {
        Ok(Self {
            rpc,
            address: parse_address(address)?,
            block,
        })
    }

    pub fn from_config(cfg: &WallConfig) -> WallResult<Self> {
        let block = BlockTag::parse(&cfg.rpc.block_tag)
            .ok_or_else(|| WallError::Decode(format!("unknown block tag {}", cfg.rpc.block_tag)))?;
        Self::new(RpcClient::new(&cfg.rpc.url)?, &cfg.contract.address, block)
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl BadgeContract for RpcBadgeContract {
    async fn balance_of(&self, owner: &str, token_id: u64) -> WallResult<U256> {
        let call = balanceOfCall {
            account: parse_address(owner)?,
            id: U256::from(token_id),
        };
        let data = format!("0x{}", hex::encode(call.abi_encode()));
        let raw: String = self
            .rpc
            .call(
                "eth_call",
                json!([{ "to": self.address.to_string(), "data": data }, self.block.to_string()]),
            )
            .await?;

        let bytes = hex::decode(raw.trim_start_matches("0x"))
            .map_err(|e| WallError::Decode(format!("eth_call result: {e}")))?;
        let ret = balanceOfCall::abi_decode_returns(&bytes, true)
            .map_err(|e| WallError::Decode(format!("balanceOf return: {e}")))?;
        debug!(owner, token_id, balance = %ret.balance, "contract: balanceOf");
        Ok(ret.balance)
    }
}

fn parse_address(raw: &str) -> WallResult<Address> {
    raw.parse().map_err(|_| WallError::InvalidAddress(raw.to_owned()))
}
