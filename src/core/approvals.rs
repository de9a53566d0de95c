//! Approval Risk Scanner
//!
//! Scores each ERC20 allowance a wallet has granted by looking at the spender
//! contract, and prepares an `approve(spender, 0)` revoke payload for every
//! approval that carries any risk.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Duration, Utc};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::traits::{ApprovalSource, ContractInspector};
use crate::models::config::{ChainId, SentinelConfig};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{RiskLevel, RiskyApproval, TokenApproval};
use crate::providers::etherscan::EtherscanClient;
use crate::providers::moralis::MoralisClient;
use crate::utils::abi;
use crate::utils::constants::{
    NEW_CONTRACT_MAX_AGE_DAYS, SCANNER_CONCURRENCY, SCORE_NEW_CONTRACT, SCORE_UNLIMITED_ALLOWANCE,
    SCORE_UNVERIFIED_CONTRACT,
};

/// What the explorer knows about a spender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpenderProfile {
    pub verified: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Score one approval; `None` when nothing about it is risky
pub fn assess_approval(
    approval: TokenApproval,
    spender: SpenderProfile,
    now: DateTime<Utc>,
) -> Option<RiskyApproval> {
    let mut score: u8 = 0;
    let mut factors = Vec::new();

    if approval.allowance == U256::MAX {
        score += SCORE_UNLIMITED_ALLOWANCE;
        factors.push("Unlimited allowance".to_string());
    }
    if !spender.verified {
        score += SCORE_UNVERIFIED_CONTRACT;
        factors.push("Non-verified contract".to_string());
    }
    if let Some(created_at) = spender.created_at {
        if now - created_at < Duration::days(NEW_CONTRACT_MAX_AGE_DAYS) {
            score += SCORE_NEW_CONTRACT;
            factors.push("Newly created contract".to_string());
        }
    }

    if score == 0 {
        return None;
    }

    let revoke_tx_data = abi::encode_approve(approval.spender, U256::ZERO);
    Some(RiskyApproval {
        approval,
        risk_score: score,
        risk_level: RiskLevel::from_score(score),
        risk_factors: factors,
        revoke_tx_data,
    })
}

pub struct ApprovalScanner {
    source: Arc<dyn ApprovalSource>,
    inspector: Arc<dyn ContractInspector>,
    concurrency: usize,
}

impl ApprovalScanner {
    pub fn new(source: Arc<dyn ApprovalSource>, inspector: Arc<dyn ContractInspector>) -> Self {
        Self {
            source,
            inspector,
            concurrency: SCANNER_CONCURRENCY,
        }
    }

    /// Moralis approvals + Etherscan-family explorer; needs `ETHERSCAN_API_KEY`
    pub fn from_config(config: &SentinelConfig) -> AppResult<Self> {
        Ok(Self::new(
            Arc::new(MoralisClient::new(config)?),
            Arc::new(EtherscanClient::new(config)?),
        ))
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    async fn profile(&self, spender: Address, chain: ChainId) -> AppResult<SpenderProfile> {
        let verified = self.inspector.is_verified(spender, chain).await?;
        let created_at = self.inspector.creation_time(spender, chain).await?;
        debug!("Spender {}: verified={} created_at={:?}", spender, verified, created_at);
        Ok(SpenderProfile {
            verified,
            created_at,
        })
    }

    /// Risky approvals of `wallet`, in the order the source listed them
    pub async fn scan(&self, wallet: Address, chain: ChainId) -> AppResult<Vec<RiskyApproval>> {
        if wallet == Address::ZERO {
            return Err(AppError::invalid_address("Wallet address must not be the zero address"));
        }

        let approvals = self.source.approvals(wallet, chain).await?;
        let total = approvals.len();
        info!("🔍 Scanning {} approval(s) of {} on {}", total, wallet, chain);

        let now = Utc::now();
        let assessed: Vec<AppResult<Option<RiskyApproval>>> = stream::iter(approvals)
            .map(|approval| async move {
                let profile = self.profile(approval.spender, chain).await?;
                Ok::<_, AppError>(assess_approval(approval, profile, now))
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let risky = assessed
            .into_iter()
            .filter_map(Result::transpose)
            .collect::<AppResult<Vec<_>>>()?;

        info!("🚨 {} of {} approval(s) flagged", risky.len(), total);
        Ok(risky)
    }
}
