//! JSON-RPC client for fork endpoints
//!
//! One request per call: no retries, no fallback endpoint. A failure is
//! reported to the caller, which ends the simulation run.
//! Gzip and the User-Agent header are set on every client built here.

use alloy_primitives::{Address, Bytes, U256};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{parse_quantity, USER_AGENT as USER_AGENT_CONST};

/// Build the shared HTTP client (gzip, User-Agent, per-request timeout)
pub fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .gzip(true)
        .build()
        .map_err(|e| AppError::invalid_config(format!("Failed to build HTTP client: {}", e)))
}

/// JSON-RPC client bound to a single endpoint
#[derive(Clone)]
pub struct RpcClient {
    url: String,
    client: reqwest::Client,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Execute a single JSON-RPC call
    pub async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<T> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        debug!(method, url = %self.masked_url(), "📡 JSON-RPC call");

        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::rpc(format!("{} failed with HTTP {}", method, status)));
        }

        let json: RpcResponse<T> = response.json().await.map_err(|e| {
            AppError::invalid_response(format!("Failed to parse {} response: {}", method, e))
        })?;

        if let Some(error) = json.error {
            return Err(AppError::rpc(format!(
                "{} error: {} (code: {})",
                method, error.message, error.code
            )));
        }

        json.result
            .ok_or_else(|| AppError::invalid_response(format!("No result in {} response", method)))
    }

    /// `eth_call` against the latest block, returns raw output bytes
    pub async fn eth_call(&self, to: Address, data: &Bytes) -> AppResult<Bytes> {
        let params = serde_json::json!([{ "to": to, "data": data }, "latest"]);
        let raw: String = self.call("eth_call", params).await?;
        let stripped = raw.strip_prefix("0x").unwrap_or(&raw);
        hex::decode(stripped)
            .map(Bytes::from)
            .map_err(|e| AppError::invalid_response(format!("eth_call returned invalid hex: {}", e)))
    }

    /// `eth_getBalance` against the latest block
    pub async fn get_balance(&self, account: Address) -> AppResult<U256> {
        let params = serde_json::json!([account, "latest"]);
        let raw: String = self.call("eth_getBalance", params).await?;
        parse_quantity(&raw)
            .ok_or_else(|| AppError::invalid_response(format!("Invalid balance quantity: {}", raw)))
    }

    /// Endpoint with any path secret masked, safe for logs
    pub fn masked_url(&self) -> String {
        mask_url(&self.url)
    }
}

/// Keep scheme and host, hide everything after the first path segment
pub fn mask_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return "***HIDDEN***".to_string();
    };
    match rest.split_once('/') {
        Some((host, path)) if !path.is_empty() => format!("{}://{}/***HIDDEN***", scheme, host),
        _ => url.to_string(),
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

/// JSON-RPC error structure
#[derive(Debug, Clone, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}
