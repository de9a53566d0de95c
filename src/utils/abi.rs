//! Contract interfaces used against the fork
//!
//! Uniswap V2 router/factory/pair, ERC20 and the Chainlink aggregator.
//! Calls are encoded here and decoded from raw `eth_call` output.

use alloy_primitives::{Address, Bytes, I256, U256};
use alloy_sol_types::{sol, SolCall};

use crate::models::errors::AppResult;

sol! {
    // Uniswap V2 Router
    function factory() external pure returns (address);

    function swapExactETHForTokens(
        uint256 amountOutMin,
        address[] calldata path,
        address to,
        uint256 deadline
    ) external payable returns (uint256[] memory amounts);

    function swapExactTokensForETH(
        uint256 amountIn,
        uint256 amountOutMin,
        address[] calldata path,
        address to,
        uint256 deadline
    ) external returns (uint256[] memory amounts);

    // Uniswap V2 Factory
    function getPair(address tokenA, address tokenB) external view returns (address pair);

    // Uniswap V2 Pair
    function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);

    // ERC20
    function approve(address spender, uint256 amount) external returns (bool);
    function balanceOf(address account) external view returns (uint256);

    // Chainlink aggregator
    function latestRoundData() external view returns (
        uint80 roundId,
        int256 answer,
        uint256 startedAt,
        uint256 updatedAt,
        uint80 answeredInRound
    );
}

pub fn encode_factory() -> Bytes {
    factoryCall {}.abi_encode().into()
}

pub fn decode_factory(output: &[u8]) -> AppResult<Address> {
    Ok(factoryCall::abi_decode_returns(output, true)?._0)
}

pub fn encode_get_pair(token_a: Address, token_b: Address) -> Bytes {
    getPairCall {
        tokenA: token_a,
        tokenB: token_b,
    }
    .abi_encode()
    .into()
}

pub fn decode_get_pair(output: &[u8]) -> AppResult<Address> {
    Ok(getPairCall::abi_decode_returns(output, true)?.pair)
}

pub fn encode_get_reserves() -> Bytes {
    getReservesCall {}.abi_encode().into()
}

/// Returns `(reserve0, reserve1)`
pub fn decode_get_reserves(output: &[u8]) -> AppResult<(U256, U256)> {
    let reserves = getReservesCall::abi_decode_returns(output, true)?;
    Ok((
        U256::from(reserves.reserve0.to::<u128>()),
        U256::from(reserves.reserve1.to::<u128>()),
    ))
}

pub fn encode_balance_of(account: Address) -> Bytes {
    balanceOfCall { account }.abi_encode().into()
}

pub fn decode_balance_of(output: &[u8]) -> AppResult<U256> {
    Ok(balanceOfCall::abi_decode_returns(output, true)?._0)
}

pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    approveCall { spender, amount }.abi_encode().into()
}

pub fn encode_latest_round_data() -> Bytes {
    latestRoundDataCall {}.abi_encode().into()
}

/// Returns the raw `answer` of the latest round
pub fn decode_latest_round_data(output: &[u8]) -> AppResult<I256> {
    Ok(latestRoundDataCall::abi_decode_returns(output, true)?.answer)
}

/// Buy leg: native -> token with no slippage protection
pub fn encode_buy(wrapped_native: Address, token: Address, to: Address, deadline: U256) -> Bytes {
    swapExactETHForTokensCall {
        amountOutMin: U256::ZERO,
        path: vec![wrapped_native, token],
        to,
        deadline,
    }
    .abi_encode()
    .into()
}

/// Sell leg: token -> native with no slippage protection
pub fn encode_sell(
    token: Address,
    wrapped_native: Address,
    amount_in: U256,
    to: Address,
    deadline: U256,
) -> Bytes {
    swapExactTokensForETHCall {
        amountIn: amount_in,
        amountOutMin: U256::ZERO,
        path: vec![token, wrapped_native],
        to,
        deadline,
    }
    .abi_encode()
    .into()
}

/// Four-byte selector of a piece of calldata, if it has one
pub fn selector_of(data: &[u8]) -> Option<[u8; 4]> {
    data.get(..4).and_then(|s| s.try_into().ok())
}

pub const FACTORY_SELECTOR: [u8; 4] = factoryCall::SELECTOR;
pub const GET_PAIR_SELECTOR: [u8; 4] = getPairCall::SELECTOR;
pub const GET_RESERVES_SELECTOR: [u8; 4] = getReservesCall::SELECTOR;
pub const BALANCE_OF_SELECTOR: [u8; 4] = balanceOfCall::SELECTOR;
pub const APPROVE_SELECTOR: [u8; 4] = approveCall::SELECTOR;
pub const LATEST_ROUND_DATA_SELECTOR: [u8; 4] = latestRoundDataCall::SELECTOR;
pub const BUY_SELECTOR: [u8; 4] = swapExactETHForTokensCall::SELECTOR;
pub const SELL_SELECTOR: [u8; 4] = swapExactTokensForETHCall::SELECTOR;
