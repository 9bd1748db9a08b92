use std::sync::Arc;

use async_trait::async_trait;
use ethers::contract::abigen;
use ethers::providers::Middleware;
use ethers::types::{Address, U256};
use num_bigint::BigUint;

use crate::{ChainClientError, ChainResult};

abigen!(
    PriceSubmitterContract,
    r#"[
        function submitHash(uint256 epochId, bytes32 hash) external returns (bool)
        function revealPrices(uint256 epochId, uint256[] indices, uint256[] prices, uint256 random) external returns (bool)
    ]"#
);

/// `submitHash`/`revealPrices` as seen by the scheduler, independent of the
/// concrete EVM client — lets `scheduler::CommitRevealScheduler` be tested
/// against a mock instead of a live chain.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit_hash(&self, epoch_id: u64, hash: [u8; 32]) -> ChainResult<()>;
    async fn reveal_prices(
        &self,
        epoch_id: u64,
        indices: &[i128],
        prices: &[i64],
        random: &BigUint,
    ) -> ChainResult<()>;
}

/// Sends `submitHash`/`revealPrices` transactions to the `PriceSubmitter`
/// contract (spec §4.3). `M` is expected to be a `SignerMiddleware` so that
/// transactions are signed with the agent's data-provider key.
pub struct SubmitterClient<M: Middleware + 'static> {
    contract: PriceSubmitterContract<M>,
}

impl<M: Middleware + 'static> SubmitterClient<M> {
    pub fn new(address: Address, client: Arc<M>) -> Self {
        SubmitterClient {
            contract: PriceSubmitterContract::new(address, client),
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> Submitter for SubmitterClient<M> {
    async fn submit_hash(&self, epoch_id: u64, hash: [u8; 32]) -> ChainResult<()> {
        self.contract
            .submit_hash(U256::from(epoch_id), hash)
            .send()
            .await
            .map_err(|err| ChainClientError::Call(format!("submitHash: {err}")))?
            .await
            .map_err(|err| ChainClientError::Call(format!("submitHash receipt: {err}")))?;
        Ok(())
    }

    async fn reveal_prices(
        &self,
        epoch_id: u64,
        indices: &[i128],
        prices: &[i64],
        random: &BigUint,
    ) -> ChainResult<()> {
        let indices: Vec<U256> = indices
            .iter()
            .map(|&i| u256_from_i128(i))
            .collect::<ChainResult<_>>()?;
        let prices: Vec<U256> = prices
            .iter()
            .map(|&p| u256_from_i64(p))
            .collect::<ChainResult<_>>()?;
        let random = U256::from_big_endian(&random.to_bytes_be());

        self.contract
            .reveal_prices(U256::from(epoch_id), indices, prices, random)
            .send()
            .await
            .map_err(|err| ChainClientError::Call(format!("revealPrices: {err}")))?
            .await
            .map_err(|err| ChainClientError::Call(format!("revealPrices receipt: {err}")))?;
        Ok(())
    }
}

fn u256_from_i128(value: i128) -> ChainResult<U256> {
    if value < 0 {
        return Err(ChainClientError::Call(format!(
            "cannot submit negative chain index {value}"
        )));
    }
    Ok(U256::from(value as u128))
}

fn u256_from_i64(value: i64) -> ChainResult<U256> {
    if value < 0 {
        return Err(ChainClientError::Call(format!(
            "cannot submit negative price {value}"
        )));
    }
    Ok(U256::from(value as u64))
}
