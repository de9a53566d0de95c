//! Price Oracle Reader - Chainlink `latestRoundData` on the fork
//!
//! No staleness check on `updatedAt`: the fork is minutes old at most.

use alloy_primitives::{Address, I256};
use tracing::info;

use crate::core::traits::ForkChain;
use crate::models::errors::{AppError, AppResult};
use crate::utils::abi;
use crate::utils::constants::{u256_to_f64, PRICE_FEED_DECIMALS};

/// Latest native/USD price from `feed`
pub async fn read_native_price(fork: &dyn ForkChain, feed: Address) -> AppResult<f64> {
    let output = fork.call(feed, abi::encode_latest_round_data()).await?;
    let answer = abi::decode_latest_round_data(&output)?;
    let price = scale_answer(answer)?;
    info!("💵 Native price: ${:.2}", price);
    Ok(price)
}

/// `answer / 10^8`; zero or negative answers are rejected
pub fn scale_answer(answer: I256) -> AppResult<f64> {
    if !answer.is_positive() {
        return Err(AppError::invalid_response(format!(
            "Price feed returned non-positive answer: {}",
            answer
        )));
    }
    Ok(u256_to_f64(answer.into_raw()) / 10f64.powi(PRICE_FEED_DECIMALS))
}
