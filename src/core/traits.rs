use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::config::ChainId;
use crate::models::errors::AppResult;
use crate::models::types::{LiquidityPool, SimulatedTx, TokenApproval};

/// Index of trading pools per token (Moralis in production)
#[async_trait]
pub trait PairIndex: Send + Sync {
    /// Every known pool containing `token` on `chain`
    async fn pairs(&self, token: Address, chain: ChainId) -> AppResult<Vec<LiquidityPool>>;
}

/// Hands out isolated forks of a live chain
#[async_trait]
pub trait ForkProvisioner: Send + Sync {
    async fn provision(&self, chain: ChainId) -> AppResult<Box<dyn ForkChain>>;
}

/// A forked chain owned by exactly one simulation run
#[async_trait]
pub trait ForkChain: Send + Sync {
    /// Read-only contract call, returns the raw ABI output
    async fn call(&self, to: Address, data: Bytes) -> AppResult<Bytes>;

    /// Native balance of an account
    async fn balance(&self, account: Address) -> AppResult<U256>;

    /// Overwrite an account's native balance (fork-only cheat)
    async fn set_balance(&self, account: Address, amount: U256) -> AppResult<()>;

    /// Execute a transaction on the fork; a revert is an error
    async fn simulate_transaction(&self, tx: &SimulatedTx) -> AppResult<()>;

    /// Endpoint for logs, with secrets masked
    fn describe(&self) -> String;
}

/// Source of a wallet's outstanding ERC20 approvals
#[async_trait]
pub trait ApprovalSource: Send + Sync {
    async fn approvals(&self, wallet: Address, chain: ChainId) -> AppResult<Vec<TokenApproval>>;
}

/// Explorer-backed facts about a contract
#[async_trait]
pub trait ContractInspector: Send + Sync {
    async fn is_verified(&self, contract: Address, chain: ChainId) -> AppResult<bool>;

    /// None when the explorer has no creation record
    async fn creation_time(&self, contract: Address, chain: ChainId) -> AppResult<Option<DateTime<Utc>>>;
}
