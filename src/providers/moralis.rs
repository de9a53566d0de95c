//! Moralis Provider
//!
//! Pair index (`/erc20/{token}/pairs`) and wallet approvals
//! (`/wallets/{wallet}/approvals`) from the Moralis Web3 Data API.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use crate::core::traits::{ApprovalSource, PairIndex};
use crate::models::config::{ChainId, SentinelConfig};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{LiquidityPool, TokenApproval};
use crate::providers::rpc::build_client;
use crate::utils::constants::parse_quantity;

/// Moralis API client
#[derive(Clone)]
pub struct MoralisClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MoralisClient {
    pub fn new(config: &SentinelConfig) -> AppResult<Self> {
        Ok(Self {
            client: build_client(config.http_timeout)?,
            base_url: config.moralis_api_url.trim_end_matches('/').to_string(),
            api_key: config.moralis_api_key.clone(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str, chain: ChainId) -> AppResult<T> {
        let response = self
            .client
            .get(url)
            .header("X-API-Key", &self.api_key)
            .query(&[("chain", chain.moralis_chain())])
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Moralis API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<MoralisErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(AppError::upstream(format!("Moralis API error: {}", detail)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Failed to parse Moralis response: {}", e)))
    }
}

#[async_trait]
impl PairIndex for MoralisClient {
    async fn pairs(&self, token: Address, chain: ChainId) -> AppResult<Vec<LiquidityPool>> {
        let url = format!("{}/erc20/{}/pairs", self.base_url, token);
        let body: PairsResponse = self.get_json(&url, chain).await?;

        let pools: Vec<LiquidityPool> = body
            .pairs
            .into_iter()
            .filter_map(|pair| match pair.exchange_address {
                Some(exchange_address) => Some(LiquidityPool {
                    exchange_address,
                    exchange_name: pair.exchange_name,
                    pair_address: pair.pair_address,
                    liquidity_usd: pair.liquidity_usd.unwrap_or(0.0),
                }),
                None => {
                    warn!("⚠️ Skipping pair without exchange address: {:?}", pair.pair_address);
                    None
                }
            })
            .collect();

        info!("🔍 Moralis reports {} pool(s) for {} on {}", pools.len(), token, chain);
        Ok(pools)
    }
}

#[async_trait]
impl ApprovalSource for MoralisClient {
    async fn approvals(&self, wallet: Address, chain: ChainId) -> AppResult<Vec<TokenApproval>> {
        let url = format!("{}/wallets/{}/approvals", self.base_url, wallet);
        let body: ApprovalsResponse = self.get_json(&url, chain).await?;

        body.result
            .into_iter()
            .map(|entry| {
                let allowance = parse_quantity(&entry.value).ok_or_else(|| {
                    AppError::upstream(format!("Invalid allowance value: {}", entry.value))
                })?;
                Ok(TokenApproval {
                    token_address: entry.token.address,
                    token_symbol: entry.token.symbol,
                    spender: entry.spender.address,
                    allowance,
                })
            })
            .collect()
    }
}

// ============================================
// RESPONSE TYPES
// ============================================

#[derive(Debug, Deserialize)]
struct PairsResponse {
    #[serde(default)]
    pairs: Vec<PairEntry>,
}

#[derive(Debug, Deserialize)]
struct PairEntry {
    exchange_address: Option<Address>,
    exchange_name: Option<String>,
    pair_address: Option<Address>,
    #[serde(default, deserialize_with = "number_or_string")]
    liquidity_usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApprovalsResponse {
    #[serde(default)]
    result: Vec<ApprovalEntry>,
}

#[derive(Debug, Deserialize)]
struct ApprovalEntry {
    value: String,
    token: ApprovalToken,
    spender: ApprovalSpender,
}

#[derive(Debug, Deserialize)]
struct ApprovalToken {
    address: Address,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApprovalSpender {
    address: Address,
}

#[derive(Debug, Deserialize)]
struct MoralisErrorBody {
    message: Option<String>,
}

/// Moralis sends `liquidity_usd` as a number or as a numeric string
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    })
}
