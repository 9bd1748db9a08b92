use std::sync::Arc;

use async_trait::async_trait;
use ethers::contract::abigen;
use ethers::providers::Middleware;
use ethers::types::Address;

use domain::EpochData;

use crate::{ChainClientError, ChainResult};

abigen!(
    FtsoManagerContract,
    r#"[
        function getCurrentPriceEpochData() external view returns (uint256 _priceEpochId, uint256 _priceEpochStartTimestamp, uint256 _priceEpochEndTimestamp, uint256 _priceEpochRevealEndTimestamp, uint256 _currentTimestamp)
    ]"#
);

/// Reads the current commit/reveal price epoch from the `FtsoManager`
/// contract (spec §4.3).
#[async_trait]
pub trait EpochOracle: Send + Sync {
    async fn current_epoch(&self) -> ChainResult<EpochData>;
}

pub struct OnChainEpochOracle<M: Middleware + 'static> {
    contract: FtsoManagerContract<M>,
}

impl<M: Middleware + 'static> OnChainEpochOracle<M> {
    pub fn new(address: Address, client: Arc<M>) -> Self {
        OnChainEpochOracle {
            contract: FtsoManagerContract::new(address, client),
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> EpochOracle for OnChainEpochOracle<M> {
    async fn current_epoch(&self) -> ChainResult<EpochData> {
        let (epoch_id, start_ts, end_ts, reveal_end_ts, now_ts) = self
            .contract
            .get_current_price_epoch_data()
            .call()
            .await
            .map_err(|err| ChainClientError::Call(format!("getCurrentPriceEpochData: {err}")))?;

        Ok(EpochData {
            epoch_id: epoch_id.as_u64(),
            start_ts: start_ts.as_u64(),
            end_ts: end_ts.as_u64(),
            reveal_end_ts: reveal_end_ts.as_u64(),
            now_ts: now_ts.as_u64(),
        })
    }
}
