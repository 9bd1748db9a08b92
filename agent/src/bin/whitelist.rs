use agent::{cli::parse_flag, config::AgentConfig, telemetry, WhitelistContext};
use anyhow::{anyhow, Context};
use domain::AssetId;
use ethers::types::Address;

/// One-shot: whitelists `--address` for the single `--token` feed name
/// (spec §6, mirroring the original's `whitelist` command).
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing()?;

    let args: Vec<String> = std::env::args().collect();
    let address = parse_flag(&args, "--address").ok_or_else(|| anyhow!("--address is required"))?;
    let token = parse_flag(&args, "--token").ok_or_else(|| anyhow!("--token is required"))?;

    let address: Address = address.parse().context("invalid --address")?;
    let asset = AssetId::from_feed_name(&token);
    if asset == AssetId::Unknown {
        return Err(anyhow!("--token {token:?} is not a known feed name"));
    }

    let config = AgentConfig::from_env()?;
    let ctx = WhitelistContext::bootstrap(&config).await?;

    let entry = ctx
        .catalog
        .by_id(asset)
        .ok_or_else(|| anyhow!("{token} is not in the configured TOKENS list"))?;

    let whitelisted = ctx.whitelist.whitelist(address, entry.chain_index).await?;
    if !whitelisted {
        return Err(anyhow!("address {address} could not be whitelisted for {token}"));
    }

    tracing::info!(%address, token, "address is whitelisted");
    Ok(())
}
