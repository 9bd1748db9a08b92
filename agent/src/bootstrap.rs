use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chain_client::contract_registry::{FTSO_MANAGER, FTSO_REGISTRY, PRICE_SUBMITTER, VOTER_WHITELISTER};
use chain_client::{ContractRegistryClient, OnChainEpochOracle, RegistryClient, SubmitterClient, WhitelistHelper};
use domain::{AssetCatalog, OracleError};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use price_feed::{PriceStore, SubscriptionManager};
use scheduler::CommitRevealScheduler;

use crate::config::AgentConfig;

/// The signed EVM client every on-chain component submits through: an HTTP
/// provider wrapped with the data-provider's key (spec §3's `Signer`).
pub type EvmClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// `coin_average_price` subscribe cadence (spec §6): a fixed property of
/// the off-chain aggregator's protocol, not a user-configurable value.
const FEED_FREQUENCY_MS: u64 = 90_000;

/// Addresses resolved once at bootstrap from the `FlareContractRegistry`
/// (spec §6).
#[derive(Debug, Clone, Copy)]
pub struct ContractAddresses {
    pub price_submitter: Address,
    pub ftso_manager: Address,
    pub ftso_registry: Address,
    pub voter_whitelister: Address,
}

/// Builds the signed client used for every subsequent contract call.
pub async fn build_client(config: &AgentConfig) -> Result<Arc<EvmClient>> {
    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .with_context(|| format!("invalid FLARE_RPCURL {:?}", config.rpc_url))?;
    let wallet: LocalWallet = config
        .signer_pk
        .parse()
        .context("invalid FLARE_SIGNERPK")?;
    let wallet = wallet.with_chain_id(config.chain_id.id());

    Ok(Arc::new(SignerMiddleware::new(provider, wallet)))
}

/// Resolves `PriceSubmitter`/`FtsoManager`/`FtsoRegistry`/`VoterWhitelister`
/// against the well-known `FlareContractRegistry` (spec §6).
pub async fn resolve_contracts(config: &AgentConfig, client: Arc<EvmClient>) -> Result<ContractAddresses> {
    let registry_address: Address = config.registry_contract_address.parse().with_context(|| {
        format!(
            "invalid FLARE_REGISTRYCONTRACTADDRESS {:?}",
            config.registry_contract_address
        )
    })?;
    let registry = ContractRegistryClient::new(registry_address, client);

    Ok(ContractAddresses {
        price_submitter: registry.resolve(PRICE_SUBMITTER).await?,
        ftso_manager: registry.resolve(FTSO_MANAGER).await?,
        ftso_registry: registry.resolve(FTSO_REGISTRY).await?,
        voter_whitelister: registry.resolve(VOTER_WHITELISTER).await?,
    })
}

/// Builds the configured `AssetCatalog` and resolves every chain index
/// against `FtsoRegistry`. Fatal (spec §7 `InvariantError`) if any
/// configured asset comes back unresolved.
pub async fn resolve_catalog(
    config: &AgentConfig,
    client: Arc<EvmClient>,
    ftso_registry: Address,
) -> Result<Arc<AssetCatalog>> {
    let unresolved = AssetCatalog::unresolved(&config.tokens, config.chain_id.is_testnet());
    let resolved = RegistryClient::new(ftso_registry, client).resolve(&unresolved).await?;

    if !resolved.fully_resolved() {
        bail!(OracleError::Invariant(
            "one or more configured assets have no on-chain FTSO index".to_string()
        ));
    }

    Ok(Arc::new(resolved))
}

/// Everything the `serve` binary needs: a running price subscription and a
/// running commit/reveal scheduler sharing one resolved `AssetCatalog` and
/// `PriceStore` (spec §2's data flow: transport → price store → scheduler).
pub struct Agent {
    pub catalog: Arc<AssetCatalog>,
    pub store: Arc<PriceStore>,
    pub subscription: Arc<SubscriptionManager>,
    pub scheduler: Arc<CommitRevealScheduler>,
}

impl Agent {
    pub async fn bootstrap(config: &AgentConfig) -> Result<Self> {
        let client = build_client(config).await?;
        let contracts = resolve_contracts(config, client.clone()).await?;
        let catalog = resolve_catalog(config, client.clone(), contracts.ftso_registry).await?;
        let sender = client.address();

        let store = Arc::new(PriceStore::new());
        let subscription = Arc::new(SubscriptionManager::new(
            config.ws_url.clone(),
            catalog.clone(),
            store.clone(),
            FEED_FREQUENCY_MS,
        ));

        let epoch_oracle = Arc::new(OnChainEpochOracle::new(contracts.ftso_manager, client.clone()));
        let submitter = Arc::new(SubmitterClient::new(contracts.price_submitter, client));

        let scheduler = Arc::new(CommitRevealScheduler::new(
            epoch_oracle,
            submitter,
            catalog.clone(),
            store.clone(),
            sender,
        ));

        Ok(Agent {
            catalog,
            store,
            subscription,
            scheduler,
        })
    }

    /// Runs the subscription manager and the commit/reveal scheduler
    /// concurrently until `stop()` cancels both (spec §4.8's
    /// `Running -> Stopped` transition).
    pub async fn run(&self) -> Result<()> {
        let subscription = self.subscription.clone();
        let sub_handle = tokio::spawn(async move { subscription.run().await });

        let result = self.scheduler.run().await;

        self.subscription.stop();
        let _ = sub_handle.await;

        result.map_err(Into::into)
    }

    pub fn stop(&self) {
        self.subscription.stop();
        self.scheduler.stop();
    }
}

/// The lighter wiring needed by `whitelist`/`whitelistall`: no price
/// subscription, no scheduler (mirrors the original's `InitForWhiteList`,
/// which skips the websocket client entirely).
pub struct WhitelistContext {
    pub catalog: Arc<AssetCatalog>,
    pub whitelist: WhitelistHelper<EvmClient>,
}

impl WhitelistContext {
    pub async fn bootstrap(config: &AgentConfig) -> Result<Self> {
        let client = build_client(config).await?;
        let contracts = resolve_contracts(config, client.clone()).await?;
        let catalog = resolve_catalog(config, client.clone(), contracts.ftso_registry).await?;
        let whitelist = WhitelistHelper::new(contracts.voter_whitelister, client);

        Ok(WhitelistContext { catalog, whitelist })
    }
}
