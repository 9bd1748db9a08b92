use std::sync::Arc;

use ethers::contract::abigen;
use ethers::providers::Middleware;
use ethers::types::Address;

use domain::AssetCatalog;

use crate::{ChainClientError, ChainResult};

abigen!(
    FtsoRegistryContract,
    r#"[
        function getSupportedIndicesAndSymbols() external view returns (uint256[] memory _supportedIndices, string[] memory _supportedSymbols)
    ]"#
);

/// Resolves an unresolved `AssetCatalog` against the on-chain `FtsoRegistry`
/// once at bootstrap, filling in every configured asset's chain index
/// (spec §4.3, replacing `FillTokenIDAndNames`).
pub struct RegistryClient<M: Middleware + 'static> {
    contract: FtsoRegistryContract<M>,
}

impl<M: Middleware + 'static> RegistryClient<M> {
    pub fn new(address: Address, client: Arc<M>) -> Self {
        RegistryClient {
            contract: FtsoRegistryContract::new(address, client),
        }
    }

    pub async fn resolve(&self, catalog: &AssetCatalog) -> ChainResult<AssetCatalog> {
        let (indices, symbols) = self
            .contract
            .get_supported_indices_and_symbols()
            .call()
            .await
            .map_err(|err| {
                ChainClientError::Call(format!("getSupportedIndicesAndSymbols: {err}"))
            })?;

        let indices: Vec<i128> = indices.iter().map(|i| i.as_u128() as i128).collect();
        Ok(catalog.with_resolved_indices(&indices, &symbols))
    }
}
