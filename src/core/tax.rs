//! Tax/Result Calculator
//!
//! Pure arithmetic over the trade outcome. Taxes are not clamped:
//! a negative buy tax or a sell tax above 100 is reported as measured.

use alloy_primitives::U256;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{PoolState, SimulationResult, TradeOutcome};
use crate::utils::constants::{u256_to_f64, wei_to_eth, HONEYPOT_SELL_TAX_THRESHOLD};

/// `(1 - tokensReceivedOnBuy / buyAmountNative) * 100`
///
/// Compares raw token units with wei, so the figure is only meaningful for
/// 18-decimal tokens priced near 1:1.
pub fn buy_tax(tokens_received_on_buy: U256, buy_amount_native: U256) -> f64 {
    (1.0 - u256_to_f64(tokens_received_on_buy) / u256_to_f64(buy_amount_native)) * 100.0
}

/// `(1 - nativeReceivedOnSell / buyAmountNative) * 100`
pub fn sell_tax(native_received_on_sell: f64, buy_amount_native: U256) -> f64 {
    (1.0 - native_received_on_sell / u256_to_f64(buy_amount_native)) * 100.0
}

/// Strictly above 50%; exactly 50 is not a honeypot
pub fn is_honeypot(sell_tax: f64) -> bool {
    sell_tax > HONEYPOT_SELL_TAX_THRESHOLD
}

/// `reserveNative * 2 / 10^18 * price`.
/// Doubles the native leg only, which assumes a balanced pool.
pub fn pool_liquidity_usd(reserve_native: U256, native_price_usd: f64) -> f64 {
    wei_to_eth(reserve_native) * 2.0 * native_price_usd
}

/// Final verdict of a completed simulation
pub fn compute_result(
    outcome: &TradeOutcome,
    pool: &PoolState,
    native_price_usd: f64,
) -> AppResult<SimulationResult> {
    if outcome.native_spent_on_buy.is_zero() {
        return Err(AppError::simulation_failed("Buy amount is zero"));
    }

    let buy = buy_tax(outcome.tokens_received_on_buy, outcome.native_spent_on_buy);
    let sell = sell_tax(outcome.native_received_on_sell(), outcome.native_spent_on_buy);
    let liquidity = pool_liquidity_usd(pool.reserve_native, native_price_usd);

    if !buy.is_finite() || !sell.is_finite() || !liquidity.is_finite() {
        return Err(AppError::simulation_failed(format!(
            "Non-finite result (buy_tax={}, sell_tax={}, liquidity={})",
            buy, sell, liquidity
        )));
    }

    Ok(SimulationResult::measured(
        is_honeypot(sell),
        buy,
        sell,
        liquidity,
    ))
}
