pub mod contract_registry;
pub mod epoch;
pub mod registry;
pub mod submitter;
pub mod whitelist;

pub use contract_registry::ContractRegistryClient;
pub use epoch::{EpochOracle, OnChainEpochOracle};
pub use registry::RegistryClient;
pub use submitter::{Submitter, SubmitterClient};
pub use whitelist::WhitelistHelper;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainClientError {
    #[error("on-chain call failed: {0}")]
    Call(String),
}

pub type ChainResult<T> = Result<T, ChainClientError>;
