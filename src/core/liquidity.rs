//! Liquidity Pool Locator
//!
//! Picks the router holding most of a token's liquidity from the pair index,
//! then confirms the `(token, wrapped native)` pair through the router's
//! factory on the fork and reads its reserves.

use alloy_primitives::Address;
use tracing::{debug, info};

use crate::core::traits::{ForkChain, PairIndex};
use crate::models::config::ChainId;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{LiquidityPool, PoolState};
use crate::utils::abi;

/// Largest pool by reported USD liquidity.
/// Linear scan with strict `>`, so ties keep the earliest entry.
pub fn select_largest_pool(pools: &[LiquidityPool]) -> AppResult<&LiquidityPool> {
    let (first, rest) = pools.split_first().ok_or_else(AppError::no_liquidity)?;
    Ok(rest.iter().fold(first, |best, pool| {
        if pool.liquidity_usd > best.liquidity_usd {
            pool
        } else {
            best
        }
    }))
}

/// Query the pair index and return the pool whose exchange acts as router
pub async fn locate_router(
    index: &dyn PairIndex,
    token: Address,
    chain: ChainId,
) -> AppResult<LiquidityPool> {
    let pools = index.pairs(token, chain).await?;
    let largest = select_largest_pool(&pools)?;
    info!(
        "💧 Largest pool: {} via {} (${:.2})",
        largest
            .pair_address
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown pair".to_string()),
        largest.exchange_name.as_deref().unwrap_or("unknown exchange"),
        largest.liquidity_usd
    );
    Ok(largest.clone())
}

/// `router.factory()`
pub async fn resolve_factory(fork: &dyn ForkChain, router: Address) -> AppResult<Address> {
    let output = fork.call(router, abi::encode_factory()).await?;
    let factory = abi::decode_factory(&output)?;
    if factory == Address::ZERO {
        return Err(AppError::invalid_response(format!(
            "Router {} reported no factory",
            router
        )));
    }
    debug!("🏭 Factory for router {}: {}", router, factory);
    Ok(factory)
}

/// `factory.getPair(token, wrapped)`; `None` when no direct pair exists
pub async fn resolve_pair(
    fork: &dyn ForkChain,
    factory: Address,
    token: Address,
    wrapped_native: Address,
) -> AppResult<Option<Address>> {
    let output = fork
        .call(factory, abi::encode_get_pair(token, wrapped_native))
        .await?;
    let pair = abi::decode_get_pair(&output)?;
    Ok((pair != Address::ZERO).then_some(pair))
}

/// `pair.getReserves()` mapped onto the native and token legs
pub async fn read_pool_state(
    fork: &dyn ForkChain,
    pair: Address,
    token: Address,
    wrapped_native: Address,
) -> AppResult<PoolState> {
    let output = fork.call(pair, abi::encode_get_reserves()).await?;
    let (reserve0, reserve1) = abi::decode_get_reserves(&output)?;
    Ok(PoolState::from_reserves(
        pair,
        token,
        wrapped_native,
        reserve0,
        reserve1,
    ))
}
