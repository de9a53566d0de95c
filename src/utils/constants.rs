//! Constants Module - Single Source of Truth
//!
//! Addresses, endpoints, thresholds and unit conversions used across the crate.
//! No other module hardcodes chain data.

use alloy_primitives::{address, Address, U256};

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "HoneypotSentinel";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = concat!("HoneypotSentinel/", env!("CARGO_PKG_VERSION"));

// ============================================
// TIMEOUTS
// ============================================

/// Per-request timeout for every outbound HTTP / JSON-RPC call (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Wall-clock bound on a whole simulation run (seconds)
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;

// ============================================
// SIMULATION PARAMETERS
// ============================================

/// Buy size used when the caller does not pass one
pub const DEFAULT_BUY_AMOUNT_USD: f64 = 50.0;

/// Swap deadline offset from "now" (seconds); enforced on-chain only
pub const SWAP_DEADLINE_SECS: i64 = 60;

/// Sell tax above this percentage classifies the token as a honeypot
pub const HONEYPOT_SELL_TAX_THRESHOLD: f64 = 50.0;

/// Chainlink USD feeds answer with 8 decimals
pub const PRICE_FEED_DECIMALS: i32 = 8;

/// Native assets on supported chains use 18 decimals
pub const NATIVE_DECIMALS: i32 = 18;

// ============================================
// APPROVAL SCANNER PARAMETERS
// ============================================

/// Spenders younger than this are flagged as newly created
pub const NEW_CONTRACT_MAX_AGE_DAYS: i64 = 30;

/// Spender lookups kept in flight per scan
pub const SCANNER_CONCURRENCY: usize = 4;

pub const SCORE_UNLIMITED_ALLOWANCE: u8 = 40;
pub const SCORE_UNVERIFIED_CONTRACT: u8 = 30;
pub const SCORE_NEW_CONTRACT: u8 = 30;

// ============================================
// EXTERNAL ENDPOINTS
// ============================================

pub const TENDERLY_API_URL: &str = "https://api.tenderly.co/api/v1";
pub const MORALIS_API_URL: &str = "https://deep-index.moralis.io/api/v2.2";
pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/api";
pub const BASESCAN_API_URL: &str = "https://api.basescan.org/api";

// ============================================
// CHAIN IDS
// ============================================

/// Ethereum Mainnet
pub const CHAIN_ID_ETHEREUM: u64 = 1;
/// Base
pub const CHAIN_ID_BASE: u64 = 8453;

// ============================================
// CONTRACT ADDRESSES
// ============================================

pub const WETH_ETHEREUM: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const WETH_BASE: Address = address!("0x4200000000000000000000000000000000000006");

/// Chainlink ETH / USD
pub const ETH_USD_FEED_ETHEREUM: Address = address!("0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419");
/// Chainlink ETH / USD
pub const ETH_USD_FEED_BASE: Address = address!("0x71041dddad3595F9CEd3DcCFBe3D127Bba988782");

// ============================================
// CONVERSION UTILITIES
// ============================================

/// Lossy U256 -> f64 conversion that never saturates at u128
pub fn u256_to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0_f64, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}

/// Convert wei to ETH (or native token)
#[inline]
pub fn wei_to_eth(wei: U256) -> f64 {
    u256_to_f64(wei) / 10f64.powi(NATIVE_DECIMALS)
}

/// `floor(usd / price * 10^18)`; None when the inputs cannot produce a positive amount
pub fn usd_to_wei(usd: f64, native_price_usd: f64) -> Option<U256> {
    if !usd.is_finite() || !native_price_usd.is_finite() || usd <= 0.0 || native_price_usd <= 0.0
    {
        return None;
    }
    let wei = (usd / native_price_usd * 10f64.powi(NATIVE_DECIMALS)).floor();
    if wei < 1.0 || wei >= u128::MAX as f64 {
        return None;
    }
    Some(U256::from(wei as u128))
}

/// Render a quantity the way JSON-RPC expects it (`0x`-prefixed, no leading zeros)
pub fn to_quantity(value: U256) -> String {
    format!("0x{:x}", value)
}

/// Parse a JSON-RPC quantity (`0x1a`) or decimal string
pub fn parse_quantity(raw: &str) -> Option<U256> {
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some("") => Some(U256::ZERO),
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16).ok(),
        None => U256::from_str_radix(raw, 10).ok(),
    }
}
