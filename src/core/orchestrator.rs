//! Simulation Orchestrator
//!
//! Sequences pool lookup, fork provisioning, price read, pair check and the
//! trade legs. Every failure collapses into a fail-safe result that flags the
//! token as a honeypot; callers never see an error.

use alloy_primitives::Address;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::core::liquidity::{locate_router, read_pool_state, resolve_factory, resolve_pair};
use crate::core::oracle::read_native_price;
use crate::core::tax::compute_result;
use crate::core::trade::{buy_amount_native, random_account, TradeSimulator};
use crate::core::traits::{ForkProvisioner, PairIndex};
use crate::models::config::{ChainId, ChainRegistry, SentinelConfig};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{SimulationRequest, SimulationResult, TradeOutcome};
use crate::providers::moralis::MoralisClient;
use crate::providers::tenderly::TenderlyForkProvisioner;

/// Progress of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStage {
    Start,
    PoolLocated,
    ForkReady,
    PriceFed,
    PairChecked,
    BuyExecuted,
    SellExecuted,
    Done,
    /// Factory knows no `(token, wrapped native)` pair
    NoDirectPair,
    Errored,
}

impl SimulationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::PoolLocated => "pool_located",
            Self::ForkReady => "fork_ready",
            Self::PriceFed => "price_fed",
            Self::PairChecked => "pair_checked",
            Self::BuyExecuted => "buy_executed",
            Self::SellExecuted => "sell_executed",
            Self::Done => "done",
            Self::NoDirectPair => "no_direct_pair",
            Self::Errored => "errored",
        }
    }

    /// Stage a run is working towards after completing `self`
    pub fn pending(&self) -> Self {
        match self {
            Self::Start => Self::PoolLocated,
            Self::PoolLocated => Self::ForkReady,
            Self::ForkReady => Self::PriceFed,
            Self::PriceFed => Self::PairChecked,
            Self::PairChecked => Self::BuyExecuted,
            Self::BuyExecuted => Self::SellExecuted,
            Self::SellExecuted => Self::Done,
            terminal => *terminal,
        }
    }
}

impl fmt::Display for SimulationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Honeypot detection entry point
pub struct HoneypotSentinel {
    pairs: Arc<dyn PairIndex>,
    forks: Arc<dyn ForkProvisioner>,
    registry: Arc<ChainRegistry>,
    run_timeout: Duration,
}

impl HoneypotSentinel {
    pub fn new(
        pairs: Arc<dyn PairIndex>,
        forks: Arc<dyn ForkProvisioner>,
        registry: Arc<ChainRegistry>,
        run_timeout: Duration,
    ) -> Self {
        Self {
            pairs,
            forks,
            registry,
            run_timeout,
        }
    }

    /// Wire the Moralis pair index and Tenderly forks from configuration
    pub fn from_config(config: &SentinelConfig, registry: Arc<ChainRegistry>) -> AppResult<Self> {
        Ok(Self::new(
            Arc::new(MoralisClient::new(config)?),
            Arc::new(TenderlyForkProvisioner::new(config)?),
            registry,
            config.run_timeout,
        ))
    }

    /// Validate the inputs and run a simulation; never fails
    pub async fn simulate(&self, token: Address, chain: ChainId, buy_amount_usd: f64) -> SimulationResult {
        match SimulationRequest::new(token, chain, buy_amount_usd) {
            Ok(request) => self.simulate_request(&request).await,
            Err(err) => {
                warn!(code = err.code_str(), "⚠️ Rejected simulation request: {}", err.message);
                SimulationResult::assumed_honeypot(err.message)
            }
        }
    }

    /// Run a simulation for a validated request; never fails
    pub async fn simulate_request(&self, request: &SimulationRequest) -> SimulationResult {
        let run_id = Uuid::new_v4();
        let mut stage = SimulationStage::Start;

        info!(
            run_id = %run_id,
            token = %request.token_address,
            chain = %request.chain,
            "🧪 Simulating ${} buy/sell",
            request.buy_amount_usd
        );

        let outcome = tokio::time::timeout(self.run_timeout, self.run(request, run_id, &mut stage)).await;

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => Self::fail(run_id, stage, err),
            Err(_) => Self::fail(
                run_id,
                stage,
                AppError::timeout(format!(
                    "Simulation timed out after {}s",
                    self.run_timeout.as_secs()
                )),
            ),
        }
    }

    async fn run(
        &self,
        request: &SimulationRequest,
        run_id: Uuid,
        stage: &mut SimulationStage,
    ) -> AppResult<SimulationResult> {
        let chain = self.registry.get(request.chain);
        let token = request.token_address;

        let pool = locate_router(self.pairs.as_ref(), token, request.chain).await?;
        let router = pool.exchange_address;
        *stage = SimulationStage::PoolLocated;

        let fork = self.forks.provision(request.chain).await?;
        *stage = SimulationStage::ForkReady;
        info!(run_id = %run_id, "🍴 Using {}", fork.describe());

        let factory = resolve_factory(fork.as_ref(), router).await?;
        let price = read_native_price(fork.as_ref(), chain.price_feed).await?;
        *stage = SimulationStage::PriceFed;

        let Some(pair) = resolve_pair(fork.as_ref(), factory, token, chain.wrapped_native).await? else {
            *stage = SimulationStage::NoDirectPair;
            let message = format!("No liquidity pool found with {}.", chain.wrapped_symbol);
            info!(run_id = %run_id, stage = %stage, "🚨 {}", message);
            return Ok(SimulationResult::assumed_honeypot(message));
        };
        let pool_state = read_pool_state(fork.as_ref(), pair, token, chain.wrapped_native).await?;
        *stage = SimulationStage::PairChecked;

        let amount_native = buy_amount_native(request.buy_amount_usd, price)?;
        let trader = TradeSimulator::new(
            fork.as_ref(),
            random_account(),
            router,
            token,
            chain.wrapped_native,
        );

        let tokens_received_on_buy = trader.buy(amount_native).await?;
        *stage = SimulationStage::BuyExecuted;

        let (native_before_sell, native_after_sell) = trader.sell(tokens_received_on_buy).await?;
        *stage = SimulationStage::SellExecuted;

        let outcome = TradeOutcome {
            native_spent_on_buy: amount_native,
            tokens_received_on_buy,
            native_before_sell,
            native_after_sell,
        };
        let result = compute_result(&outcome, &pool_state, price)?;
        *stage = SimulationStage::Done;

        info!(run_id = %run_id, "{}", result.summary());
        Ok(result)
    }

    /// Errored: log the stage that failed and degrade to the fail-safe result
    fn fail(run_id: Uuid, completed: SimulationStage, err: AppError) -> SimulationResult {
        let stage = completed.pending();
        if err.code.is_terminal_signal() {
            info!(run_id = %run_id, stage = %stage, "🚨 {}", err.message);
        } else {
            error!(
                run_id = %run_id,
                stage = %stage,
                last_completed = %completed,
                code = err.code_str(),
                "❌ Simulation failed: {}",
                err.message
            );
        }
        SimulationResult::assumed_honeypot(err.message)
    }
}
