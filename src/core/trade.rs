//! Trade Simulator
//!
//! Funds a throwaway account on the fork and runs buy -> approve -> sell
//! through the router, recording balances around each leg.
//! Legs run strictly in order and a failed leg ends the run.

use alloy_primitives::{Address, U256};
use chrono::Utc;
use rand::Rng;
use tracing::{debug, info};

use crate::core::traits::ForkChain;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::SimulatedTx;
use crate::utils::abi;
use crate::utils::constants::{usd_to_wei, wei_to_eth, NATIVE_DECIMALS, SWAP_DEADLINE_SECS};

/// Fresh random account, never reused across runs
pub fn random_account() -> Address {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill(&mut bytes);
    Address::from(bytes)
}

/// `floor(usd / price * 10^18)`, zero and overflow are rejected
pub fn buy_amount_native(buy_amount_usd: f64, native_price_usd: f64) -> AppResult<U256> {
    usd_to_wei(buy_amount_usd, native_price_usd).ok_or_else(|| {
        let wei = buy_amount_usd / native_price_usd * 10f64.powi(NATIVE_DECIMALS);
        let reason = if wei >= u128::MAX as f64 {
            "exceeds the simulated amount range"
        } else {
            "rounds to zero"
        };
        AppError::simulation_failed(format!(
            "Buy amount of ${} at ${} per native unit {}",
            buy_amount_usd, native_price_usd, reason
        ))
    })
}

/// Swap deadline: now + 60 seconds
fn deadline() -> U256 {
    let at = Utc::now().timestamp().saturating_add(SWAP_DEADLINE_SECS);
    U256::from(u64::try_from(at).unwrap_or_default())
}

/// Name the failing leg; transport and revert errors become rejections
fn leg_failed(leg: &str, err: AppError) -> AppError {
    match err.code {
        ErrorCode::RpcError | ErrorCode::SimulationRejected => {
            AppError::simulation_rejected(format!("{} rejected: {}", leg, err.message))
        }
        code => AppError::new(code, format!("{}: {}", leg, err.message)),
    }
}

pub struct TradeSimulator<'a> {
    fork: &'a dyn ForkChain,
    account: Address,
    router: Address,
    token: Address,
    wrapped_native: Address,
}

impl<'a> TradeSimulator<'a> {
    pub fn new(
        fork: &'a dyn ForkChain,
        account: Address,
        router: Address,
        token: Address,
        wrapped_native: Address,
    ) -> Self {
        Self {
            fork,
            account,
            router,
            token,
            wrapped_native,
        }
    }

    /// Fund the account, swap native for tokens, return the token balance
    pub async fn buy(&self, amount_native: U256) -> AppResult<U256> {
        self.fork
            .set_balance(self.account, amount_native)
            .await
            .map_err(|e| leg_failed("Funding", e))?;

        let buy = SimulatedTx {
            from: self.account,
            to: self.router,
            data: abi::encode_buy(self.wrapped_native, self.token, self.account, deadline()),
            value: amount_native,
        };
        self.fork
            .simulate_transaction(&buy)
            .await
            .map_err(|e| leg_failed("Buy swap", e))?;

        let output = self
            .fork
            .call(self.token, abi::encode_balance_of(self.account))
            .await?;
        let received = abi::decode_balance_of(&output)?;

        info!(
            "🟢 Buy: {:.6} native -> {} token units",
            wei_to_eth(amount_native),
            received
        );
        Ok(received)
    }

    /// Approve the router and swap every bought token back.
    /// Returns the native balance `(before, after)` the sell.
    pub async fn sell(&self, token_amount: U256) -> AppResult<(U256, U256)> {
        let approve = SimulatedTx {
            from: self.account,
            to: self.token,
            data: abi::encode_approve(self.router, token_amount),
            value: U256::ZERO,
        };
        self.fork
            .simulate_transaction(&approve)
            .await
            .map_err(|e| leg_failed("Approve", e))?;

        let before = self.fork.balance(self.account).await?;

        let sell = SimulatedTx {
            from: self.account,
            to: self.router,
            data: abi::encode_sell(
                self.token,
                self.wrapped_native,
                token_amount,
                self.account,
                deadline(),
            ),
            value: U256::ZERO,
        };
        self.fork
            .simulate_transaction(&sell)
            .await
            .map_err(|e| leg_failed("Sell swap", e))?;

        let after = self.fork.balance(self.account).await?;

        debug!("Native balance around sell: {} -> {}", before, after);
        info!("🔴 Sell: {} token units -> balance {:.6} native", token_amount, wei_to_eth(after));
        Ok((before, after))
    }
}
