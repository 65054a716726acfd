/// Example serving platform-token metrics through the read cache
///
/// This example shows how to:
/// 1. Load cache configuration from the environment
/// 2. Build a cached contract reader over an HTTP provider
/// 3. Read supply, decimals and fees, with repeated reads served from cache
/// 4. Render the JSON bodies an API route would return
///
/// Run with:
/// ```bash
/// RPC_URL=https://mainnet.example.org/rpc \
/// TOKEN_ADDRESS=0x... \
/// CHAINCACHE_TTL_SECS=30 \
/// CHAINCACHE_TTL_DECIMALS=86400 \
/// cargo run --example token_metrics
/// ```
use alloy_primitives::Address;
use anyhow::{Context, Result};
use chaincache::{
    http_provider, ContractReader, ErrorResponse, ReadCacheConfig, ReadResponse, TokenReads,
};
use std::env;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    dotenvy::dotenv().ok();

    let rpc_url = env::var("RPC_URL").context("RPC_URL environment variable not set")?;
    let token: Address = env::var("TOKEN_ADDRESS")
        .context("TOKEN_ADDRESS environment variable not set")?
        .parse()
        .context("TOKEN_ADDRESS is not a valid address")?;

    let config = ReadCacheConfig::from_env()?;
    info!(
        default_ttl = ?config.default_ttl,
        fetch_timeout = ?config.fetch_timeout,
        refresh_mode = %config.refresh_mode,
        "Loaded cache configuration"
    );

    let provider = http_provider(&rpc_url)?;
    let reads = TokenReads::new(ContractReader::new(provider, config), token);

    // The second round of reads is answered from the cache
    for round in 1..=2 {
        info!(round, token = %token, "Reading token metrics");

        match reads.total_supply().await {
            Ok(read) => print_json("totalSupply", &ReadResponse::from(read))?,
            Err(e) => {
                warn!(status = e.status_code(), "totalSupply read failed");
                print_json("totalSupply", &ErrorResponse::from(&e))?;
            }
        }

        match reads.decimals().await {
            Ok(read) => print_json("decimals", &ReadResponse::from(read))?,
            Err(e) => print_json("decimals", &ErrorResponse::from(&e))?,
        }

        match reads.fees().await {
            Ok(read) => print_json("fees", &ReadResponse::from(read))?,
            Err(e) => print_json("fees", &ErrorResponse::from(&e))?,
        }
    }

    info!(stats = %reads.reader().cache().stats(), "Cache statistics");

    Ok(())
}

fn print_json(label: &str, body: &impl serde::Serialize) -> Result<()> {
    println!("{label}: {}", serde_json::to_string_pretty(body)?);
    Ok(())
}
