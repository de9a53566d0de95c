//! End-to-end simulation runs against in-memory fakes
//!
//! The fake fork dispatches on calldata selectors and keeps balances, so the
//! whole orchestrator pipeline runs without network access.

use alloy_primitives::{address, Address, Bytes, I256, U256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use honeypot_sentinel::core::trade::TradeSimulator;
use honeypot_sentinel::core::traits::{
    ApprovalSource, ContractInspector, ForkChain, ForkProvisioner, PairIndex,
};
use honeypot_sentinel::models::types::{LiquidityPool, SimulatedTx};
use honeypot_sentinel::utils::abi;
use honeypot_sentinel::{
    AppError, AppResult, ApprovalScanner, ChainId, ChainRegistry, HoneypotSentinel, RiskLevel,
    TokenApproval,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Above every WETH address, so WETH is token0 and reserve0 is the native leg
const TOKEN: Address = address!("0xfffffffffffffffffffffffffffffffffffffff0");
const ROUTER: Address = address!("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D");
const OTHER_ROUTER: Address = address!("0x4752ba5DBc23f44D87826276BF6Fd6b1C372aD24");
const FACTORY: Address = address!("0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");
const PAIR: Address = address!("0x00000000000000000000000000000000000000aa");

const BUY_WEI: u128 = 25_000_000_000_000_000; // $50 at $2000
const ONE_ETH: u128 = 1_000_000_000_000_000_000;

// ============================================
// FAKES
// ============================================

struct FakePairIndex {
    pools: Vec<LiquidityPool>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakePairIndex {
    fn new(pools: Vec<LiquidityPool>) -> Self {
        Self {
            pools,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PairIndex for FakePairIndex {
    async fn pairs(&self, _token: Address, _chain: ChainId) -> AppResult<Vec<LiquidityPool>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.pools.clone())
    }
}

/// Step of the run the fake fork refuses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FailAt {
    Factory,
    PriceFeed,
    Funding,
    Buy,
    Approve,
    Sell,
}

/// Market behaviour of the simulated token, in percent
#[derive(Clone, Copy)]
struct Market {
    price_answer: i64,
    pair: Address,
    reserve0: u128,
    reserve1: u128,
    /// tokens received per 100 wei on buy
    buy_return_pct: u128,
    /// wei received per 100 tokens on sell
    sell_return_pct: u128,
    fail_at: Option<FailAt>,
}

impl Default for Market {
    fn default() -> Self {
        Self {
            price_answer: 2000_00000000,
            pair: PAIR,
            reserve0: 10 * ONE_ETH,
            reserve1: 5_000 * ONE_ETH,
            buy_return_pct: 100,
            sell_return_pct: 100,
            fail_at: None,
        }
    }
}

#[derive(Default)]
struct ForkState {
    native: HashMap<Address, U256>,
    tokens: HashMap<Address, U256>,
    /// every contract touched through `call`
    calls_to: Vec<Address>,
    /// simulated legs in order
    legs: Vec<&'static str>,
    funded: Vec<(Address, U256)>,
}

#[derive(Clone)]
struct FakeFork {
    market: Market,
    state: Arc<Mutex<ForkState>>,
}

impl FakeFork {
    fn new(market: Market) -> Self {
        Self {
            market,
            state: Arc::new(Mutex::new(ForkState::default())),
        }
    }

    fn legs(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().legs.clone()
    }

    fn fails_at(&self, step: FailAt) -> bool {
        self.market.fail_at == Some(step)
    }

    fn rejected(to: Address) -> AppError {
        AppError::simulation_rejected(format!("Transaction to {} reverted on fork", to))
    }
}

#[async_trait]
impl ForkChain for FakeFork {
    async fn call(&self, to: Address, data: Bytes) -> AppResult<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.calls_to.push(to);
        match abi::selector_of(&data) {
            Some(abi::FACTORY_SELECTOR) if self.fails_at(FailAt::Factory) => {
                return Err(AppError::rpc("execution reverted"))
            }
            Some(abi::LATEST_ROUND_DATA_SELECTOR) if self.fails_at(FailAt::PriceFeed) => {
                return Err(AppError::rpc("execution reverted"))
            }
            _ => {}
        }
        let out = match abi::selector_of(&data) {
            Some(abi::FACTORY_SELECTOR) => FACTORY.abi_encode(),
            Some(abi::GET_PAIR_SELECTOR) => self.market.pair.abi_encode(),
            Some(abi::GET_RESERVES_SELECTOR) => (
                U256::from(self.market.reserve0),
                U256::from(self.market.reserve1),
                1_700_000_000u32,
            )
                .abi_encode(),
            Some(abi::LATEST_ROUND_DATA_SELECTOR) => (
                U256::from(1u8),
                I256::try_from(self.market.price_answer).unwrap(),
                U256::ZERO,
                U256::ZERO,
                U256::from(1u8),
            )
                .abi_encode(),
            Some(abi::BALANCE_OF_SELECTOR) => {
                let account = Address::from_slice(&data[16..36]);
                state.tokens.get(&account).copied().unwrap_or_default().abi_encode()
            }
            _ => return Err(AppError::rpc("execution reverted")),
        };
        Ok(out.into())
    }

    async fn balance(&self, account: Address) -> AppResult<U256> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .native
            .get(&account)
            .copied()
            .unwrap_or_default())
    }

    async fn set_balance(&self, account: Address, amount: U256) -> AppResult<()> {
        if self.fails_at(FailAt::Funding) {
            return Err(AppError::rpc("tenderly_setBalance unavailable"));
        }
        let mut state = self.state.lock().unwrap();
        state.native.insert(account, amount);
        state.funded.push((account, amount));
        Ok(())
    }

    async fn simulate_transaction(&self, tx: &SimulatedTx) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        match abi::selector_of(&tx.data) {
            Some(abi::BUY_SELECTOR) => {
                state.legs.push("buy");
                if self.fails_at(FailAt::Buy) {
                    return Err(Self::rejected(tx.to));
                }
                let native = state.native.entry(tx.from).or_default();
                *native -= tx.value;
                let bought = tx.value * U256::from(self.market.buy_return_pct) / U256::from(100u8);
                *state.tokens.entry(tx.from).or_default() += bought;
            }
            Some(abi::APPROVE_SELECTOR) => {
                state.legs.push("approve");
                if self.fails_at(FailAt::Approve) {
                    return Err(Self::rejected(tx.to));
                }
            }
            Some(abi::SELL_SELECTOR) => {
                state.legs.push("sell");
                if self.fails_at(FailAt::Sell) {
                    return Err(Self::rejected(tx.to));
                }
                let sold = state.tokens.remove(&tx.from).unwrap_or_default();
                let received = sold * U256::from(self.market.sell_return_pct) / U256::from(100u8);
                *state.native.entry(tx.from).or_default() += received;
            }
            _ => return Err(AppError::simulation_rejected("unknown transaction")),
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "fork fake".to_string()
    }
}

struct FakeProvisioner {
    fork: FakeFork,
    fail_with: Option<String>,
    calls: AtomicUsize,
}

impl FakeProvisioner {
    fn new(market: Market) -> Self {
        Self {
            fork: FakeFork::new(market),
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ForkProvisioner for FakeProvisioner {
    async fn provision(&self, _chain: ChainId) -> AppResult<Box<dyn ForkChain>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(AppError::fork_provision(message.clone())),
            None => Ok(Box::new(self.fork.clone())),
        }
    }
}

fn pool(router: Address, liquidity_usd: f64) -> LiquidityPool {
    LiquidityPool {
        exchange_address: router,
        exchange_name: Some("Uniswap v2".to_string()),
        pair_address: Some(PAIR),
        liquidity_usd,
    }
}

fn sentinel(pairs: Arc<FakePairIndex>, forks: Arc<FakeProvisioner>) -> HoneypotSentinel {
    HoneypotSentinel::new(
        pairs,
        forks,
        Arc::new(ChainRegistry::new()),
        Duration::from_secs(10),
    )
}

// ============================================
// ORCHESTRATOR
// ============================================

#[tokio::test]
async fn test_clean_token_round_trip() {
    let pairs = Arc::new(FakePairIndex::new(vec![pool(ROUTER, 1000.0)]));
    let forks = Arc::new(FakeProvisioner::new(Market::default()));

    let result = sentinel(pairs, forks.clone())
        .simulate(TOKEN, ChainId::Ethereum, 50.0)
        .await;

    assert!(!result.is_honeypot);
    assert_eq!(result.simulation_error, None);
    assert!(result.buy_tax.unwrap().abs() < 1e-9);
    assert!(result.sell_tax.unwrap().abs() < 1e-9);
    // 10 ETH native reserve, doubled, at $2000
    assert!((result.pool_liquidity_usd.unwrap() - 40_000.0).abs() < 1e-6);

    assert_eq!(forks.fork.legs(), vec!["buy", "approve", "sell"]);
    let state = forks.fork.state.lock().unwrap();
    assert_eq!(state.funded.len(), 1);
    assert_eq!(state.funded[0].1, U256::from(BUY_WEI));
}

#[tokio::test]
async fn test_sell_tax_above_threshold_is_honeypot() {
    let market = Market {
        sell_return_pct: 40,
        ..Market::default()
    };
    let pairs = Arc::new(FakePairIndex::new(vec![pool(ROUTER, 1000.0)]));
    let forks = Arc::new(FakeProvisioner::new(market));

    let result = sentinel(pairs, forks).simulate(TOKEN, ChainId::Base, 50.0).await;

    assert!(result.is_honeypot);
    assert!((result.sell_tax.unwrap() - 60.0).abs() < 1e-9);
    assert!(result.simulation_error.is_none());
}

#[tokio::test]
async fn test_buy_tax_is_measured() {
    let market = Market {
        buy_return_pct: 90,
        ..Market::default()
    };
    let pairs = Arc::new(FakePairIndex::new(vec![pool(ROUTER, 1000.0)]));
    let forks = Arc::new(FakeProvisioner::new(market));

    let result = sentinel(pairs, forks).simulate(TOKEN, ChainId::Ethereum, 50.0).await;

    assert!((result.buy_tax.unwrap() - 10.0).abs() < 1e-9);
    // 90% of the spend comes back on sell
    assert!((result.sell_tax.unwrap() - 10.0).abs() < 1e-9);
    assert!(!result.is_honeypot);
}

#[tokio::test]
async fn test_empty_pair_index_never_provisions_a_fork() {
    let pairs = Arc::new(FakePairIndex::new(vec![]));
    let forks = Arc::new(FakeProvisioner::new(Market::default()));

    let result = sentinel(pairs.clone(), forks.clone())
        .simulate(TOKEN, ChainId::Ethereum, 50.0)
        .await;

    assert!(result.is_honeypot);
    assert_eq!(
        result.simulation_error.as_deref(),
        Some("No liquidity pools found for this token.")
    );
    assert_eq!(pairs.calls.load(Ordering::SeqCst), 1);
    assert_eq!(forks.calls.load(Ordering::SeqCst), 0);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "is_honeypot": true,
            "simulation_error": "No liquidity pools found for this token."
        })
    );
}

#[tokio::test]
async fn test_zero_pair_is_terminal_without_swaps() {
    let market = Market {
        pair: Address::ZERO,
        ..Market::default()
    };
    let pairs = Arc::new(FakePairIndex::new(vec![pool(ROUTER, 1000.0)]));
    let forks = Arc::new(FakeProvisioner::new(market));

    let result = sentinel(pairs, forks.clone())
        .simulate(TOKEN, ChainId::Base, 50.0)
        .await;

    assert!(result.is_honeypot);
    assert_eq!(
        result.simulation_error.as_deref(),
        Some("No liquidity pool found with WETH.")
    );
    assert!(result.buy_tax.is_none());
    assert!(forks.fork.legs().is_empty());
    assert!(forks.fork.state.lock().unwrap().funded.is_empty());
}

#[tokio::test]
async fn test_reverted_sell_degrades_to_fail_safe() {
    let market = Market {
        fail_at: Some(FailAt::Sell),
        ..Market::default()
    };
    let pairs = Arc::new(FakePairIndex::new(vec![pool(ROUTER, 1000.0)]));
    let forks = Arc::new(FakeProvisioner::new(market));

    let result = sentinel(pairs, forks).simulate(TOKEN, ChainId::Ethereum, 50.0).await;

    assert!(result.is_honeypot);
    let message = result.simulation_error.unwrap();
    assert!(message.starts_with("Sell swap rejected"), "{}", message);
    assert!(result.sell_tax.is_none());
    assert!(result.pool_liquidity_usd.is_none());
}

#[tokio::test]
async fn test_any_failing_step_degrades_to_fail_safe() {
    let cases = [
        (FailAt::Factory, "execution reverted", 0),
        (FailAt::PriceFeed, "execution reverted", 0),
        (FailAt::Funding, "Funding rejected", 0),
        (FailAt::Buy, "Buy swap rejected", 1),
        (FailAt::Approve, "Approve rejected", 2),
        (FailAt::Sell, "Sell swap rejected", 3),
    ];

    for (step, expected, legs_run) in cases {
        let market = Market {
            fail_at: Some(step),
            ..Market::default()
        };
        let pairs = Arc::new(FakePairIndex::new(vec![pool(ROUTER, 1000.0)]));
        let forks = Arc::new(FakeProvisioner::new(market));

        let result = sentinel(pairs, forks.clone())
            .simulate(TOKEN, ChainId::Ethereum, 50.0)
            .await;

        assert!(result.is_honeypot, "{:?}", step);
        let message = result.simulation_error.clone().unwrap();
        assert!(message.contains(expected), "{:?}: {}", step, message);
        assert!(result.buy_tax.is_none(), "{:?}", step);
        assert!(result.sell_tax.is_none(), "{:?}", step);
        assert!(result.pool_liquidity_usd.is_none(), "{:?}", step);
        assert_eq!(forks.fork.legs().len(), legs_run, "{:?}", step);
    }
}

#[tokio::test]
async fn test_fork_provision_failure_is_fail_safe() {
    let pairs = Arc::new(FakePairIndex::new(vec![pool(ROUTER, 1000.0)]));
    let forks = Arc::new(FakeProvisioner {
        fail_with: Some("Error creating Tenderly Fork: quota exceeded".to_string()),
        ..FakeProvisioner::new(Market::default())
    });

    let result = sentinel(pairs, forks).simulate(TOKEN, ChainId::Ethereum, 50.0).await;

    assert!(result.is_honeypot);
    assert_eq!(
        result.simulation_error.as_deref(),
        Some("Error creating Tenderly Fork: quota exceeded")
    );
}

#[tokio::test]
async fn test_largest_pool_router_is_used() {
    let pairs = Arc::new(FakePairIndex::new(vec![
        pool(OTHER_ROUTER, 10.0),
        pool(ROUTER, 5_000.0),
        pool(OTHER_ROUTER, 5_000.0),
    ]));
    let forks = Arc::new(FakeProvisioner::new(Market::default()));

    sentinel(pairs, forks.clone())
        .simulate(TOKEN, ChainId::Ethereum, 50.0)
        .await;

    let state = forks.fork.state.lock().unwrap();
    assert_eq!(state.calls_to.first(), Some(&ROUTER));
    assert!(!state.calls_to.contains(&OTHER_ROUTER));
}

#[tokio::test]
async fn test_invalid_amount_short_circuits() {
    let pairs = Arc::new(FakePairIndex::new(vec![pool(ROUTER, 1000.0)]));
    let forks = Arc::new(FakeProvisioner::new(Market::default()));

    let result = sentinel(pairs.clone(), forks)
        .simulate(TOKEN, ChainId::Ethereum, -1.0)
        .await;

    assert!(result.is_honeypot);
    assert!(result.simulation_error.is_some());
    assert_eq!(pairs.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_run_timeout_is_fail_safe() {
    let pairs = Arc::new(FakePairIndex {
        delay: Some(Duration::from_secs(5)),
        ..FakePairIndex::new(vec![pool(ROUTER, 1000.0)])
    });
    let forks = Arc::new(FakeProvisioner::new(Market::default()));
    let sentinel = HoneypotSentinel::new(
        pairs,
        forks.clone(),
        Arc::new(ChainRegistry::new()),
        Duration::from_millis(50),
    );

    let result = sentinel.simulate(TOKEN, ChainId::Ethereum, 50.0).await;

    assert!(result.is_honeypot);
    assert!(result.simulation_error.unwrap().contains("timed out"));
    assert_eq!(forks.calls.load(Ordering::SeqCst), 0);
}

// ============================================
// TRADE SIMULATOR
// ============================================

#[tokio::test]
async fn test_trade_simulator_records_balances() {
    let fork = FakeFork::new(Market {
        sell_return_pct: 50,
        ..Market::default()
    });
    let account = address!("0x4675C7e5BaAFB509941273635dF8eF3eda0B0b99");
    let weth = ChainRegistry::new().get(ChainId::Ethereum).wrapped_native;
    let trader = TradeSimulator::new(&fork, account, ROUTER, TOKEN, weth);

    let bought = trader.buy(U256::from(BUY_WEI)).await.unwrap();
    let (before, after) = trader.sell(bought).await.unwrap();

    assert_eq!(bought, U256::from(BUY_WEI));
    assert_eq!(before, U256::ZERO);
    assert_eq!(after, U256::from(BUY_WEI / 2));
    assert_eq!(fork.legs(), vec!["buy", "approve", "sell"]);
}

// ============================================
// APPROVAL SCANNER
// ============================================

struct FakeApprovals(Vec<TokenApproval>);

#[async_trait]
impl ApprovalSource for FakeApprovals {
    async fn approvals(&self, _wallet: Address, _chain: ChainId) -> AppResult<Vec<TokenApproval>> {
        Ok(self.0.clone())
    }
}

struct FakeExplorer {
    verified: Vec<Address>,
    created: HashMap<Address, DateTime<Utc>>,
}

#[async_trait]
impl ContractInspector for FakeExplorer {
    async fn is_verified(&self, contract: Address, _chain: ChainId) -> AppResult<bool> {
        Ok(self.verified.contains(&contract))
    }

    async fn creation_time(
        &self,
        contract: Address,
        _chain: ChainId,
    ) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self.created.get(&contract).copied())
    }
}

#[tokio::test]
async fn test_scanner_keeps_order_and_drops_safe_approvals() {
    let fresh = address!("0x00000000000000000000000000000000000000f1");
    let old_verified = address!("0x00000000000000000000000000000000000000f2");
    let unverified = address!("0x00000000000000000000000000000000000000f3");

    let approval = |spender: Address, allowance: U256| TokenApproval {
        token_address: TOKEN,
        token_symbol: None,
        spender,
        allowance,
    };
    let source = FakeApprovals(vec![
        approval(fresh, U256::MAX),
        approval(old_verified, U256::from(10u8)),
        approval(unverified, U256::from(10u8)),
    ]);

    let now = Utc::now();
    let explorer = FakeExplorer {
        verified: vec![old_verified],
        created: HashMap::from([
            (fresh, now - ChronoDuration::days(3)),
            (old_verified, now - ChronoDuration::days(900)),
            (unverified, now - ChronoDuration::days(900)),
        ]),
    };

    let scanner = ApprovalScanner::new(Arc::new(source), Arc::new(explorer)).with_concurrency(2);
    let wallet = address!("0x2222222222222222222222222222222222222222");
    let risky = scanner.scan(wallet, ChainId::Base).await.unwrap();

    assert_eq!(risky.len(), 2);
    assert_eq!(risky[0].approval.spender, fresh);
    assert_eq!(risky[0].risk_score, 100);
    assert_eq!(risky[0].risk_level, RiskLevel::Critical);
    assert_eq!(risky[1].approval.spender, unverified);
    assert_eq!(risky[1].risk_level, RiskLevel::Medium);

    let json = serde_json::to_value(&risky[0]).unwrap();
    assert_eq!(json["risk_level"], "critical");
    assert_eq!(json["allowance"], U256::MAX.to_string());
}

#[tokio::test]
async fn test_scanner_rejects_zero_wallet() {
    let scanner = ApprovalScanner::new(
        Arc::new(FakeApprovals(vec![])),
        Arc::new(FakeExplorer {
            verified: vec![],
            created: HashMap::new(),
        }),
    );
    assert!(scanner.scan(Address::ZERO, ChainId::Ethereum).await.is_err());
}
