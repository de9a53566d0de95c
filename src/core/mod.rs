//! Core Module - Simulation Engine & Approval Scanner
//!
//! Trait seams, the simulation pipeline and its orchestrator.

pub mod approvals;
pub mod liquidity;
pub mod oracle;
pub mod orchestrator;
pub mod tax;
pub mod trade;
pub mod traits;

pub use approvals::{ApprovalScanner, SpenderProfile};
pub use orchestrator::{HoneypotSentinel, SimulationStage};
pub use trade::TradeSimulator;
pub use traits::*;
