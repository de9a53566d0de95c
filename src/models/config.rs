//! Configuration module
//!
//! Chain data comes from utils/constants.rs and is assembled once into an
//! immutable `ChainRegistry`. Credentials come from the environment and are
//! validated up front, so a missing key fails before any network call.

use alloy_primitives::Address;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    BASESCAN_API_URL, CHAIN_ID_BASE, CHAIN_ID_ETHEREUM, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_RUN_TIMEOUT_SECS, ETHERSCAN_API_URL, ETH_USD_FEED_BASE, ETH_USD_FEED_ETHEREUM,
    MORALIS_API_URL, TENDERLY_API_URL, WETH_BASE, WETH_ETHEREUM,
};

/// Supported blockchain networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum ChainId {
    Ethereum = CHAIN_ID_ETHEREUM,
    Base = CHAIN_ID_BASE,
}

impl ChainId {
    pub const ALL: [ChainId; 2] = [ChainId::Ethereum, ChainId::Base];

    pub fn numeric_id(&self) -> u64 {
        *self as u64
    }

    /// Chain parameter expected by the Moralis API (hex chain id)
    pub fn moralis_chain(&self) -> String {
        format!("0x{:x}", self.numeric_id())
    }

    /// Block explorer API for the chain
    pub fn explorer_api_url(&self) -> &'static str {
        match self {
            Self::Ethereum => ETHERSCAN_API_URL,
            Self::Base => BASESCAN_API_URL,
        }
    }
}

impl FromStr for ChainId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "ethereum" | "eth" | "1" | "0x1" => Ok(Self::Ethereum),
            "base" | "8453" | "0x2105" => Ok(Self::Base),
            other => Err(AppError::unsupported_chain(other)),
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ethereum => write!(f, "mainnet"),
            Self::Base => write!(f, "base"),
        }
    }
}

/// Chain-specific contract addresses
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub chain: ChainId,
    pub wrapped_symbol: &'static str,
    pub wrapped_native: Address,
    pub price_feed: Address,
}

impl ChainConfig {
    pub fn numeric_id(&self) -> u64 {
        self.chain.numeric_id()
    }

    fn for_chain(chain: ChainId) -> Self {
        match chain {
            ChainId::Ethereum => Self {
                chain,
                wrapped_symbol: "WETH",
                wrapped_native: WETH_ETHEREUM,
                price_feed: ETH_USD_FEED_ETHEREUM,
            },
            ChainId::Base => Self {
                chain,
                wrapped_symbol: "WETH",
                wrapped_native: WETH_BASE,
                price_feed: ETH_USD_FEED_BASE,
            },
        }
    }
}

/// Read-only registry of every supported chain, built once per process
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: HashMap<ChainId, ChainConfig>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        let chains = ChainId::ALL
            .iter()
            .map(|&chain| (chain, ChainConfig::for_chain(chain)))
            .collect();
        Self { chains }
    }

    pub fn get(&self, chain: ChainId) -> &ChainConfig {
        // Every ChainId variant is inserted in `new`
        &self.chains[&chain]
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Tenderly account credentials
#[derive(Clone)]
pub struct TenderlyCredentials {
    pub account: String,
    pub project: String,
    pub access_key: String,
}

impl fmt::Debug for TenderlyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenderlyCredentials")
            .field("account", &self.account)
            .field("project", &self.project)
            .field("access_key", &"***HIDDEN***")
            .finish()
    }
}

/// Process-wide configuration for the sentinel
#[derive(Clone)]
pub struct SentinelConfig {
    pub tenderly: TenderlyCredentials,
    pub tenderly_api_url: String,
    pub moralis_api_key: String,
    pub moralis_api_url: String,
    /// Only required by the approval scanner
    pub etherscan_api_key: Option<String>,
    /// Timeout applied to each HTTP / JSON-RPC request
    pub http_timeout: Duration,
    /// Wall-clock bound on a whole simulation run
    pub run_timeout: Duration,
}

impl fmt::Debug for SentinelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentinelConfig")
            .field("tenderly", &self.tenderly)
            .field("tenderly_api_url", &self.tenderly_api_url)
            .field("moralis_api_key", &"***HIDDEN***")
            .field("moralis_api_url", &self.moralis_api_url)
            .field("etherscan_api_key", &self.etherscan_api_key.as_ref().map(|_| "***HIDDEN***"))
            .field("http_timeout", &self.http_timeout)
            .field("run_timeout", &self.run_timeout)
            .finish()
    }
}

impl SentinelConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup (environment, map in tests)
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> AppResult<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::missing_api_key(key))
        };
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let tenderly = TenderlyCredentials {
            account: required("TENDERLY_USERNAME")?,
            project: required("TENDERLY_PROJECT_NAME")?,
            access_key: required("TENDERLY_API_KEY")?,
        };
        let moralis_api_key = required("MORALIS_API_KEY")?;
        let etherscan_api_key = optional("ETHERSCAN_API_KEY");

        let run_timeout_secs = match optional("SENTINEL_RUN_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::invalid_config(format!("SENTINEL_RUN_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_RUN_TIMEOUT_SECS,
        };
        if run_timeout_secs == 0 {
            return Err(AppError::invalid_config(
                "SENTINEL_RUN_TIMEOUT_SECS must be at least 1",
            ));
        }

        info!("🔑 Tenderly and Moralis credentials configured (keys hidden)");
        if etherscan_api_key.is_some() {
            info!("🔑 ETHERSCAN_API_KEY configured (key hidden)");
        }

        Ok(Self {
            tenderly,
            tenderly_api_url: optional("TENDERLY_API_URL").unwrap_or_else(|| TENDERLY_API_URL.to_string()),
            moralis_api_key,
            moralis_api_url: optional("MORALIS_API_URL").unwrap_or_else(|| MORALIS_API_URL.to_string()),
            etherscan_api_key,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            run_timeout: Duration::from_secs(run_timeout_secs),
        })
    }
}
