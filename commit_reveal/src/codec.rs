use domain::AssetId;
use ethers::abi::{encode, Token};
use ethers::types::{Address, U256};
use ethers::utils::keccak256;
use num_bigint::BigUint;

use crate::CodecError;

/// One asset's chain index and fixed-point price, paired for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedPrice {
    pub asset: AssetId,
    pub chain_index: i128,
    pub price: i64,
}

/// Sort `(chain_index, price)` pairs by chain index ascending.
///
/// This is the one sort point in the whole commit/reveal path: spec §3
/// requires the same ordering in the commit hash and the cleartext reveal,
/// so both call sites must use this function on the same input.
pub fn sort_by_index(mut items: Vec<IndexedPrice>) -> Vec<IndexedPrice> {
    items.sort_by_key(|item| item.chain_index);
    items
}

/// Build the commit hash over the already-sorted `(indices, prices)` pair,
/// a random nonce, and the submitting address.
///
/// ABI-encodes the tuple `(uint256[], uint256[], uint256, address)` with
/// the standard head/tail dynamic-array layout and applies keccak256,
/// mirroring the original's `abiCoder.NewCoder([]string{"uint256[]",
/// "uint256[]", "uint256", "address"}).KeccakHash(...)`.
///
/// All chain indices and prices are assumed non-negative — the caller is
/// responsible for that invariant (indices come from a resolved
/// `AssetCatalog`; prices come from `domain::to_fixed_point`, which never
/// produces a negative value for a real quote).
pub fn commit_hash(
    sorted: &[IndexedPrice],
    random: &BigUint,
    sender: Address,
) -> Result<[u8; 32], CodecError> {
    let index_tokens = sorted
        .iter()
        .map(|item| u256_from_i128(item.chain_index).map(Token::Uint))
        .collect::<Result<Vec<_>, _>>()?;
    let price_tokens = sorted
        .iter()
        .map(|item| u256_from_i64(item.price).map(Token::Uint))
        .collect::<Result<Vec<_>, _>>()?;
    let random_token = Token::Uint(u256_from_biguint(random));

    let encoded = encode(&[
        Token::Array(index_tokens),
        Token::Array(price_tokens),
        random_token,
        Token::Address(sender),
    ]);

    Ok(keccak256(encoded))
}

fn u256_from_i128(value: i128) -> Result<U256, CodecError> {
    if value < 0 {
        return Err(CodecError::NegativeValue);
    }
    Ok(U256::from(value as u128))
}

fn u256_from_i64(value: i64) -> Result<U256, CodecError> {
    if value < 0 {
        return Err(CodecError::NegativeValue);
    }
    Ok(U256::from(value as u64))
}

fn u256_from_biguint(value: &BigUint) -> U256 {
    U256::from_big_endian(&value.to_bytes_be())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> Address {
        "0x000000000000000000000000000000000000dEaD"
            .parse()
            .unwrap()
    }

    fn sample() -> Vec<IndexedPrice> {
        vec![
            IndexedPrice {
                asset: AssetId::Eth,
                chain_index: 5,
                price: 200_012_345,
            },
            IndexedPrice {
                asset: AssetId::Btc,
                chain_index: 2,
                price: 6_000_090_000,
            },
        ]
    }

    #[test]
    fn sort_orders_by_chain_index() {
        let sorted = sort_by_index(sample());
        assert_eq!(sorted[0].asset, AssetId::Btc);
        assert_eq!(sorted[1].asset, AssetId::Eth);
    }

    #[test]
    fn hash_is_32_bytes_and_deterministic() {
        let sorted = sort_by_index(sample());
        let random = BigUint::from(12345u32);
        let h1 = commit_hash(&sorted, &random, addr()).unwrap();
        let h2 = commit_hash(&sorted, &random, addr()).unwrap();
        assert_eq!(h1.len(), 32);
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_changes_with_random() {
        let sorted = sort_by_index(sample());
        let h1 = commit_hash(&sorted, &BigUint::from(1u32), addr()).unwrap();
        let h2 = commit_hash(&sorted, &BigUint::from(2u32), addr()).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn hash_is_permutation_invariant_when_presorted() {
        // Any permutation that respects the sorted-by-index order must
        // produce the same hash, since sort_by_index is deterministic for
        // equal inputs regardless of input order.
        let mut reversed = sample();
        reversed.reverse();
        let sorted_a = sort_by_index(sample());
        let sorted_b = sort_by_index(reversed);
        let random = BigUint::from(7u32);
        let h1 = commit_hash(&sorted_a, &random, addr()).unwrap();
        let h2 = commit_hash(&sorted_b, &random, addr()).unwrap();
        assert_eq!(h1, h2);
    }
}
