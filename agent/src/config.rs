use std::env;

use anyhow::{Context, Result};
use domain::{AssetId, ChainId};

/// Runtime configuration for the oracle agent (spec §6). Fatal to build —
/// any missing or invalid value aborts startup via `OracleError::Config`.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub ws_url: String,
    pub rpc_url: String,
    pub chain_id: ChainId,
    pub registry_contract_address: String,
    pub signer_pk: String,
    pub tokens: Vec<AssetId>,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let chain_id = parse_chain_id("FLARE_CHAINID")?;
        let tokens = parse_tokens("TOKENS")?;

        if tokens.is_empty() {
            anyhow::bail!("TOKENS must list at least one feed name");
        }

        Ok(Self {
            ws_url: env::var("WS_URL").context("WS_URL must be set")?,
            rpc_url: env::var("FLARE_RPCURL").context("FLARE_RPCURL must be set")?,
            chain_id,
            registry_contract_address: env::var("FLARE_REGISTRYCONTRACTADDRESS")
                .context("FLARE_REGISTRYCONTRACTADDRESS must be set")?,
            signer_pk: env::var("FLARE_SIGNERPK").context("FLARE_SIGNERPK must be set")?,
            tokens,
        })
    }
}

fn parse_chain_id(key: &str) -> Result<ChainId> {
    let raw = env::var(key).with_context(|| format!("{key} must be set"))?;
    let id: u64 = raw
        .parse()
        .with_context(|| format!("{key} must be a valid chain id, got {raw:?}"))?;

    match ChainId::from_u64(id) {
        ChainId::Unknown => anyhow::bail!("{key}={id} is not a supported Flare chain id"),
        chain => Ok(chain),
    }
}

fn parse_tokens(key: &str) -> Result<Vec<AssetId>> {
    let raw = env::var(key).with_context(|| format!("{key} must be set"))?;

    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match AssetId::from_feed_name(item) {
            AssetId::Unknown => Err(anyhow::anyhow!("{key} lists unknown feed name {item:?}")),
            asset => Ok(asset),
        })
        .collect()
}
