pub mod codec;
pub mod prime;

pub use codec::{commit_hash, sort_by_index, IndexedPrice};
pub use prime::random_prime_130;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to generate a 130-bit prime after exhausting all attempts")]
    PrimeGenerationFailed,
    #[error("negative value cannot be ABI-encoded as uint256")]
    NegativeValue,
}
