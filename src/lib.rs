//! Honeypot Sentinel
//!
//! Fork-based token risk analysis:
//! - Honeypot detection via a simulated Buy-Approve-Sell cycle on a Tenderly fork
//! - Buy/sell tax and pool liquidity measurement
//! - Wallet approval risk scanning with revoke payloads

pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{ApprovalScanner, HoneypotSentinel, SimulationStage};
pub use models::{
    AppError, AppResult, ChainConfig, ChainId, ChainRegistry, ErrorCode, RiskLevel, RiskyApproval,
    SentinelConfig, SimulationRequest, SimulationResult, TokenApproval,
};
