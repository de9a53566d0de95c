//! Honeypot Sentinel CLI
//!
//! ```text
//! honeypot-sentinel <token> <chain> [buy_usd]
//! honeypot-sentinel scan <wallet> <chain>
//! ```
//!
//! Prints the result as JSON on stdout; logs go to stderr.

use alloy_primitives::Address;
use eyre::{bail, eyre, Result};
use honeypot_sentinel::utils::constants::{APP_NAME, APP_VERSION};
use honeypot_sentinel::{
    ApprovalScanner, ChainId, ChainRegistry, HoneypotSentinel, SentinelConfig, SimulationRequest,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str = "usage:\n  honeypot-sentinel <token> <chain> [buy_usd]\n  honeypot-sentinel scan <wallet> <chain>";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args[0] == "-h" || args[0] == "--help" {
        println!("{} v{}\n{}", APP_NAME, APP_VERSION, USAGE);
        return Ok(());
    }

    // Missing credentials fail here, before any network call
    let config = SentinelConfig::from_env()?;
    info!("🚀 {} v{} starting", APP_NAME, APP_VERSION);

    let output = match args.as_slice() {
        [cmd, wallet, chain] if cmd == "scan" => {
            let wallet: Address = wallet
                .trim()
                .parse()
                .map_err(|_| eyre!("Invalid wallet address: {}", wallet))?;
            let chain: ChainId = chain.parse()?;
            let scanner = ApprovalScanner::from_config(&config)?;
            let risky = scanner.scan(wallet, chain).await?;
            serde_json::to_string_pretty(&risky)?
        }
        [token, chain] | [token, chain, _] => {
            let buy_usd = match args.get(2) {
                Some(raw) => Some(
                    raw.parse::<f64>()
                        .map_err(|_| eyre!("buy_usd is not a number: {}", raw))?,
                ),
                None => None,
            };
            let request = SimulationRequest::parse(token, chain, buy_usd)?;
            let sentinel = HoneypotSentinel::from_config(&config, Arc::new(ChainRegistry::new()))?;
            let result = sentinel.simulate_request(&request).await;
            serde_json::to_string_pretty(&result)?
        }
        _ => bail!("{}", USAGE),
    };

    println!("{}", output);
    Ok(())
}
