//! Tenderly Provider
//!
//! Creates an ephemeral fork per run and drives it through its JSON-RPC
//! endpoint, including the `tenderly_*` cheat methods.
//! Forks are not deleted afterwards; Tenderly expires them.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::core::traits::{ForkChain, ForkProvisioner};
use crate::models::config::{ChainId, SentinelConfig, TenderlyCredentials};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::SimulatedTx;
use crate::providers::rpc::{build_client, mask_url, RpcClient};
use crate::utils::constants::to_quantity;

/// Fork creation client
pub struct TenderlyForkProvisioner {
    client: reqwest::Client,
    api_url: String,
    credentials: TenderlyCredentials,
}

impl TenderlyForkProvisioner {
    pub fn new(config: &SentinelConfig) -> AppResult<Self> {
        Ok(Self {
            client: build_client(config.http_timeout)?,
            api_url: config.tenderly_api_url.trim_end_matches('/').to_string(),
            credentials: config.tenderly.clone(),
        })
    }

    fn fork_url(&self) -> String {
        format!(
            "{}/account/{}/project/{}/fork",
            self.api_url, self.credentials.account, self.credentials.project
        )
    }
}

#[async_trait]
impl ForkProvisioner for TenderlyForkProvisioner {
    async fn provision(&self, chain: ChainId) -> AppResult<Box<dyn ForkChain>> {
        let body = serde_json::json!({ "network_id": chain.numeric_id().to_string() });

        let response = self
            .client
            .post(self.fork_url())
            .header("X-Access-Key", &self.credentials.access_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::fork_provision(format!("Error creating Tenderly Fork: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ProviderErrorBody>()
                .await
                .ok()
                .and_then(ProviderErrorBody::into_message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(AppError::fork_provision(format!(
                "Error creating Tenderly Fork: {}",
                detail
            )));
        }

        let created: ForkResponse = response.json().await.map_err(|e| {
            AppError::fork_provision(format!("Unexpected fork response from Tenderly: {}", e))
        })?;

        let fork = created.simulation_fork;
        info!(fork_id = %fork.id, rpc = %mask_url(&fork.rpc_url), "🍴 Fork ready on {}", chain);

        Ok(Box::new(ForkSession::new(
            fork.id,
            fork.rpc_url,
            chain,
            self.client.clone(),
        )))
    }
}

/// A single fork, used by exactly one run and dropped afterwards
pub struct ForkSession {
    pub fork_id: String,
    chain: ChainId,
    /// JSON-RPC client bound to the fork's endpoint
    rpc: RpcClient,
}

impl ForkSession {
    pub fn new(fork_id: String, rpc_endpoint: String, chain: ChainId, client: reqwest::Client) -> Self {
        Self {
            fork_id,
            chain,
            rpc: RpcClient::new(rpc_endpoint, client),
        }
    }
}

#[async_trait]
impl ForkChain for ForkSession {
    async fn call(&self, to: Address, data: Bytes) -> AppResult<Bytes> {
        self.rpc.eth_call(to, &data).await
    }

    async fn balance(&self, account: Address) -> AppResult<U256> {
        self.rpc.get_balance(account).await
    }

    async fn set_balance(&self, account: Address, amount: U256) -> AppResult<()> {
        let params = serde_json::json!([account, to_quantity(amount)]);
        let _: serde_json::Value = self.rpc.call("tenderly_setBalance", params).await?;
        Ok(())
    }

    async fn simulate_transaction(&self, tx: &SimulatedTx) -> AppResult<()> {
        let mut call = serde_json::json!({
            "from": tx.from,
            "to": tx.to,
            "data": tx.data,
        });
        if !tx.value.is_zero() {
            call["value"] = serde_json::Value::String(to_quantity(tx.value));
        }

        let result: SimulationResponse = self
            .rpc
            .call("tenderly_simulateTransaction", serde_json::json!([call]))
            .await?;

        debug!(fork_id = %self.fork_id, status = ?result.status, gas_used = ?result.gas_used, "🧪 Simulated tx");

        match result.status {
            Some(true) => Ok(()),
            Some(false) => Err(AppError::simulation_rejected(format!(
                "Transaction to {} reverted on fork",
                tx.to
            ))),
            None => Err(AppError::simulation_rejected(format!(
                "Simulation of transaction to {} reported no status",
                tx.to
            ))),
        }
    }

    fn describe(&self) -> String {
        format!("fork {} of {} ({})", self.fork_id, self.chain, self.rpc.masked_url())
    }
}

#[derive(Debug, Deserialize)]
struct ForkResponse {
    simulation_fork: ForkInfo,
}

#[derive(Debug, Deserialize)]
struct ForkInfo {
    id: String,
    rpc_url: String,
}

/// Tenderly reports errors either flat or nested under `error`
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
    error: Option<NestedError>,
}

#[derive(Debug, Deserialize)]
struct NestedError {
    message: Option<String>,
}

impl ProviderErrorBody {
    fn into_message(self) -> Option<String> {
        self.message.or_else(|| self.error.and_then(|e| e.message))
    }
}

#[derive(Debug, Deserialize)]
struct SimulationResponse {
    status: Option<bool>,
    #[serde(rename = "gasUsed")]
    gas_used: Option<serde_json::Value>,
}
