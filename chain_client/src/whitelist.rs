use std::sync::Arc;
use std::time::Duration;

use ethers::contract::abigen;
use ethers::providers::Middleware;
use ethers::types::{Address, U256};

use crate::{ChainClientError, ChainResult};

abigen!(
    VoterWhitelisterContract,
    r#"[
        function requestWhitelistingVoter(address voter, uint256 ftsoIndex) external
        function getFtsoWhitelistedPriceProviders(uint256 ftsoIndex) external view returns (address[] memory)
    ]"#
);

const RECHECK_DELAY: Duration = Duration::from_secs(3);

/// Requests data-provider whitelisting for a single FTSO index, or all of
/// them (spec §4.7, grounded on the `whitelist`/`whitelistall` commands and
/// `IVoterWhiteLister`).
///
/// A one-shot utility, not part of the scheduler's hot loop.
pub struct WhitelistHelper<M: Middleware + 'static> {
    contract: VoterWhitelisterContract<M>,
}

impl<M: Middleware + 'static> WhitelistHelper<M> {
    pub fn new(address: Address, client: Arc<M>) -> Self {
        WhitelistHelper {
            contract: VoterWhitelisterContract::new(address, client),
        }
    }

    /// Whitelists `voter` for `ftso_index` if not already present: reads the
    /// current provider list, and if absent, sends
    /// `requestWhitelistingVoter`, waits ~3s, and re-reads. Returns whether
    /// `voter` is present after this call.
    pub async fn whitelist(&self, voter: Address, ftso_index: i128) -> ChainResult<bool> {
        if ftso_index < 0 {
            return Err(ChainClientError::Call(format!(
                "cannot whitelist unresolved index {ftso_index}"
            )));
        }
        let index = U256::from(ftso_index as u128);

        if self.is_whitelisted(voter, index).await? {
            return Ok(true);
        }

        self.contract
            .request_whitelisting_voter(voter, index)
            .send()
            .await
            .map_err(|err| ChainClientError::Call(format!("requestWhitelistingVoter: {err}")))?
            .await
            .map_err(|err| {
                ChainClientError::Call(format!("requestWhitelistingVoter receipt: {err}"))
            })?;

        tokio::time::sleep(RECHECK_DELAY).await;
        self.is_whitelisted(voter, index).await
    }

    pub async fn whitelist_all(&self, voter: Address, ftso_indices: &[i128]) -> ChainResult<()> {
        for &index in ftso_indices {
            self.whitelist(voter, index).await?;
        }
        Ok(())
    }

    async fn is_whitelisted(&self, voter: Address, index: U256) -> ChainResult<bool> {
        let providers = self
            .contract
            .get_ftso_whitelisted_price_providers(index)
            .call()
            .await
            .map_err(|err| {
                ChainClientError::Call(format!("getFtsoWhitelistedPriceProviders: {err}"))
            })?;
        Ok(providers.contains(&voter))
    }
}
