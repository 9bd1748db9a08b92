pub mod asset;
pub mod chain_id;
pub mod commit;
pub mod epoch;
pub mod error;
pub mod quote;

pub use asset::{AssetCatalog, AssetEntry, AssetId};
pub use chain_id::ChainId;
pub use commit::CommitRecord;
pub use epoch::EpochData;
pub use error::{OracleError, OracleResult};
pub use quote::{to_fixed_point, Quote};
