use agent::{cli::parse_flag, config::AgentConfig, telemetry, WhitelistContext};
use anyhow::{anyhow, Context};
use ethers::types::Address;

/// One-shot: whitelists `--address` for every asset in the configured
/// `TOKENS` set (spec §6, mirroring the original's `whitelistall` command).
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing()?;

    let args: Vec<String> = std::env::args().collect();
    let address = parse_flag(&args, "--address").ok_or_else(|| anyhow!("--address is required"))?;
    let address: Address = address.parse().context("invalid --address")?;

    let config = AgentConfig::from_env()?;
    let ctx = WhitelistContext::bootstrap(&config).await?;

    let indices: Vec<i128> = ctx.catalog.entries().iter().map(|entry| entry.chain_index).collect();
    ctx.whitelist.whitelist_all(address, &indices).await?;

    tracing::info!(%address, count = indices.len(), "address whitelisted for all configured tokens");
    Ok(())
}
