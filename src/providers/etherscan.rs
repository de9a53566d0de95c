//! Etherscan-family explorer client (Etherscan, Basescan)
//!
//! Used by the approval scanner to judge spender contracts.

use alloy_primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::core::traits::ContractInspector;
use crate::models::config::{ChainId, SentinelConfig};
use crate::models::errors::{AppError, AppResult};
use crate::providers::rpc::build_client;
use crate::utils::constants::parse_quantity;

pub struct EtherscanClient {
    client: reqwest::Client,
    api_key: String,
    /// Replaces the per-chain explorer URL when set
    base_url: Option<String>,
}

impl EtherscanClient {
    /// Requires `ETHERSCAN_API_KEY`; the same key is sent to every explorer
    pub fn new(config: &SentinelConfig) -> AppResult<Self> {
        let api_key = config
            .etherscan_api_key
            .clone()
            .ok_or_else(|| AppError::missing_api_key("ETHERSCAN_API_KEY"))?;
        Ok(Self {
            client: build_client(config.http_timeout)?,
            api_key,
            base_url: None,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn endpoint(&self, chain: ChainId) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| chain.explorer_api_url())
    }

    async fn query<T: for<'de> Deserialize<'de>>(
        &self,
        chain: ChainId,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let response = self
            .client
            .get(self.endpoint(chain))
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Explorer API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(format!("Explorer API error: HTTP {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Failed to parse explorer response: {}", e)))
    }
}

#[async_trait]
impl ContractInspector for EtherscanClient {
    async fn is_verified(&self, contract: Address, chain: ChainId) -> AppResult<bool> {
        let address = contract.to_string();
        let body: ExplorerStatus = self
            .query(
                chain,
                &[("module", "contract"), ("action", "getabi"), ("address", &address)],
            )
            .await?;
        Ok(body.status == "1")
    }

    async fn creation_time(&self, contract: Address, chain: ChainId) -> AppResult<Option<DateTime<Utc>>> {
        let address = contract.to_string();
        let creation: ContractCreationResponse = self
            .query(
                chain,
                &[
                    ("module", "contract"),
                    ("action", "getcontractcreation"),
                    ("contractaddresses", &address),
                ],
            )
            .await?;

        let tx_hash = match (creation.status.as_str(), creation.result.first()) {
            ("1", Some(entry)) => entry.tx_hash.clone(),
            _ => {
                debug!("No creation record for {}", contract);
                return Ok(None);
            }
        };

        let tx: ProxyResponse<ProxyTransaction> = self
            .query(
                chain,
                &[
                    ("module", "proxy"),
                    ("action", "eth_getTransactionByHash"),
                    ("txhash", &tx_hash),
                ],
            )
            .await?;
        let block_number = tx
            .result
            .and_then(|t| t.block_number)
            .ok_or_else(|| AppError::upstream(format!("Creation tx {} has no block", tx_hash)))?;

        let block: ProxyResponse<ProxyBlock> = self
            .query(
                chain,
                &[
                    ("module", "proxy"),
                    ("action", "eth_getBlockByNumber"),
                    ("tag", &block_number),
                    ("boolean", "false"),
                ],
            )
            .await?;
        let raw_timestamp = block
            .result
            .map(|b| b.timestamp)
            .ok_or_else(|| AppError::upstream(format!("Block {} not found", block_number)))?;

        let seconds = parse_quantity(&raw_timestamp)
            .and_then(|ts| i64::try_from(ts).ok())
            .ok_or_else(|| AppError::upstream(format!("Invalid block timestamp: {}", raw_timestamp)))?;

        Ok(Utc.timestamp_opt(seconds, 0).single())
    }
}

#[derive(Debug, Deserialize)]
struct ExplorerStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ContractCreationResponse {
    status: String,
    /// An error string instead of a list when the lookup fails
    #[serde(default, deserialize_with = "list_or_empty")]
    result: Vec<ContractCreation>,
}

#[derive(Debug, Deserialize)]
struct ContractCreation {
    #[serde(rename = "txHash")]
    tx_hash: String,
}

#[derive(Debug, Deserialize)]
struct ProxyResponse<T> {
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ProxyTransaction {
    #[serde(rename = "blockNumber")]
    block_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProxyBlock {
    timestamp: String,
}

fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<ContractCreation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
