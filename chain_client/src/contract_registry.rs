use std::sync::Arc;

use ethers::contract::abigen;
use ethers::providers::Middleware;
use ethers::types::Address;

use crate::{ChainClientError, ChainResult};

abigen!(
    FlareContractRegistryContract,
    r#"[
        function getContractAddressByName(string name) external view returns (address)
    ]"#
);

pub const PRICE_SUBMITTER: &str = "PriceSubmitter";
pub const FTSO_MANAGER: &str = "FtsoManager";
pub const FTSO_REGISTRY: &str = "FtsoRegistry";
pub const VOTER_WHITELISTER: &str = "VoterWhitelister";

/// Resolves well-known contract addresses (`PriceSubmitter`, `FtsoManager`,
/// `FtsoRegistry`, `VoterWhitelister`) against the `FlareContractRegistry`
/// at a fixed, chain-provided address (spec §6).
pub struct ContractRegistryClient<M: Middleware + 'static> {
    contract: FlareContractRegistryContract<M>,
}

impl<M: Middleware + 'static> ContractRegistryClient<M> {
    pub fn new(address: Address, client: Arc<M>) -> Self {
        ContractRegistryClient {
            contract: FlareContractRegistryContract::new(address, client),
        }
    }

    pub async fn resolve(&self, name: &str) -> ChainResult<Address> {
        self.contract
            .get_contract_address_by_name(name.to_string())
            .call()
            .await
            .map_err(|err| {
                ChainClientError::Call(format!("getContractAddressByName({name}): {err}"))
            })
    }
}
