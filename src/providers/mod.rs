//! Providers Module - External Services
//!
//! Fork JSON-RPC, Tenderly, Moralis and the Etherscan-family explorers.

pub mod etherscan;
pub mod moralis;
pub mod rpc;
pub mod tenderly;

pub use etherscan::EtherscanClient;
pub use moralis::MoralisClient;
pub use rpc::RpcClient;
pub use tenderly::{ForkSession, TenderlyForkProvisioner};
