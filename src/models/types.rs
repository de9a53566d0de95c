//! Type definitions for the sentinel
//! Requests, intermediate chain state and the externally visible results

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::models::config::ChainId;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{u256_to_f64, DEFAULT_BUY_AMOUNT_USD};

// ============================================
// Simulation request
// ============================================

/// Validated input of a honeypot simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub token_address: Address,
    pub chain: ChainId,
    pub buy_amount_usd: f64,
}

impl SimulationRequest {
    /// Build a request from already-typed parts
    pub fn new(token_address: Address, chain: ChainId, buy_amount_usd: f64) -> AppResult<Self> {
        if token_address == Address::ZERO {
            return Err(AppError::invalid_address("Token address must not be the zero address"));
        }
        if !buy_amount_usd.is_finite() || buy_amount_usd <= 0.0 {
            return Err(AppError::bad_request(format!(
                "buy_amount_usd must be a positive number, got {}",
                buy_amount_usd
            )));
        }
        Ok(Self {
            token_address,
            chain,
            buy_amount_usd,
        })
    }

    /// Build a request from caller-supplied strings
    pub fn parse(token_address: &str, chain: &str, buy_amount_usd: Option<f64>) -> AppResult<Self> {
        let trimmed = token_address.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_address("Token address is empty"));
        }
        let token: Address = trimmed
            .parse()
            .map_err(|_| AppError::invalid_address(format!("Invalid token address: {}", trimmed)))?;
        let chain: ChainId = chain.parse()?;
        Self::new(token, chain, buy_amount_usd.unwrap_or(DEFAULT_BUY_AMOUNT_USD))
    }
}

// ============================================
// Pair index / pool state
// ============================================

/// One pool reported by the pair index
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityPool {
    /// Router (exchange) the pool trades through
    pub exchange_address: Address,
    pub exchange_name: Option<String>,
    pub pair_address: Option<Address>,
    pub liquidity_usd: f64,
}

/// Reserves of the `(token, wrapped native)` pair read from the fork
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    pub pair_address: Address,
    pub reserve_native: U256,
    pub reserve_token: U256,
}

impl PoolState {
    /// Map `(reserve0, reserve1)` onto the native/token legs.
    /// Uniswap V2 sorts the pair so `token0` is the lower address.
    pub fn from_reserves(
        pair_address: Address,
        token: Address,
        wrapped_native: Address,
        reserve0: U256,
        reserve1: U256,
    ) -> Self {
        let (reserve_native, reserve_token) = if wrapped_native < token {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };
        Self {
            pair_address,
            reserve_native,
            reserve_token,
        }
    }
}

// ============================================
// Trade legs
// ============================================

/// Transaction object handed to the fork's simulation endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedTx {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// Balance observations gathered by the trade simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeOutcome {
    /// Native amount sent into the buy swap
    pub native_spent_on_buy: U256,
    /// Token balance of the synthetic account after the buy
    pub tokens_received_on_buy: U256,
    pub native_before_sell: U256,
    pub native_after_sell: U256,
}

impl TradeOutcome {
    /// `after - before`; negative values are kept, never clamped
    pub fn native_received_on_sell(&self) -> f64 {
        if self.native_after_sell >= self.native_before_sell {
            u256_to_f64(self.native_after_sell - self.native_before_sell)
        } else {
            -u256_to_f64(self.native_before_sell - self.native_after_sell)
        }
    }
}

// ============================================
// Simulation result
// ============================================

/// The only artifact a caller ever sees from a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub is_honeypot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_tax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_tax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_liquidity_usd: Option<f64>,
    pub simulation_error: Option<String>,
}

impl SimulationResult {
    /// Fully measured result
    pub fn measured(is_honeypot: bool, buy_tax: f64, sell_tax: f64, pool_liquidity_usd: f64) -> Self {
        Self {
            is_honeypot,
            buy_tax: Some(buy_tax),
            sell_tax: Some(sell_tax),
            pool_liquidity_usd: Some(pool_liquidity_usd),
            simulation_error: None,
        }
    }

    /// Fail-safe result: anything uncertain is treated as a honeypot
    pub fn assumed_honeypot(message: impl Into<String>) -> Self {
        Self {
            is_honeypot: true,
            buy_tax: None,
            sell_tax: None,
            pool_liquidity_usd: None,
            simulation_error: Some(message.into()),
        }
    }

    /// Summary for display
    pub fn summary(&self) -> String {
        match (&self.simulation_error, self.buy_tax, self.sell_tax) {
            (Some(err), _, _) => format!("🚨 HONEYPOT (assumed) | {}", err),
            (None, Some(buy), Some(sell)) if self.is_honeypot => format!(
                "🚨 HONEYPOT DETECTED | Buy Tax: {:.2}% | Sell Tax: {:.2}% | Liquidity: ${:.2}",
                buy,
                sell,
                self.pool_liquidity_usd.unwrap_or_default()
            ),
            (None, Some(buy), Some(sell)) => format!(
                "✅ SAFE | Buy Tax: {:.2}% | Sell Tax: {:.2}% | Liquidity: ${:.2}",
                buy,
                sell,
                self.pool_liquidity_usd.unwrap_or_default()
            ),
            _ => format!("is_honeypot: {}", self.is_honeypot),
        }
    }
}

// ============================================
// Approval scanner
// ============================================

/// An ERC20 allowance held by a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenApproval {
    pub token_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_symbol: Option<String>,
    pub spender: Address,
    #[serde(serialize_with = "serialize_decimal")]
    pub allowance: U256,
}

/// Risk classification of an approval
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            70..=u8::MAX => Self::Critical,
            40..=69 => Self::High,
            30..=39 => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Approval that scored above zero, with a ready-made revoke payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskyApproval {
    #[serde(flatten)]
    pub approval: TokenApproval,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    /// `approve(spender, 0)` calldata, to be sent to `token_address`
    pub revoke_tx_data: Bytes,
}

fn serialize_decimal<S: serde::Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}
