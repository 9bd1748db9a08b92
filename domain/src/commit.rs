use crate::asset::AssetId;

/// The captured state of one outstanding commit, passed unchanged to its
/// matching reveal. Exactly one of these exists per epoch with a
/// successful `submitHash`.
///
/// `assets` and `prices` are parallel arrays, already sorted by chain index
/// ascending (spec §3 invariant) — the codec in `commit_reveal` is
/// responsible for producing them in that order before a `CommitRecord` is
/// built.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub epoch_id: u64,
    pub assets: Vec<AssetId>,
    pub prices: Vec<i64>,
    pub random: num_bigint::BigUint,
}
