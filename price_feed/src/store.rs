use std::collections::HashMap;

use domain::AssetId;
use tokio::sync::Mutex;

/// Latest-quote-per-asset store. Entries survive across epochs: if no new
/// quote arrives for an asset, the previous value stays in place and a
/// commit simply re-uses it.
///
/// Per spec §9's redesign note, this is a single mutex-guarded map rather
/// than a concurrent map with ad-hoc locking: every mutation and read takes
/// the same lock, and `snapshot` is the sole whole-map read primitive.
#[derive(Debug, Default)]
pub struct PriceStore {
    prices: Mutex<HashMap<AssetId, i64>>,
}

impl PriceStore {
    pub fn new() -> Self {
        PriceStore {
            prices: Mutex::new(HashMap::new()),
        }
    }

    pub async fn set(&self, asset: AssetId, price: i64) {
        self.prices.lock().await.insert(asset, price);
    }

    /// Read a consistent snapshot of `assets`, in the given order, defaulting
    /// any asset with no recorded quote to `0`. Not atomic across keys with
    /// concurrent writes to other keys — callers tolerate stale-by-one-tick
    /// reads, per spec §5.
    pub async fn snapshot(&self, assets: &[AssetId]) -> Vec<i64> {
        let guard = self.prices.lock().await;
        assets
            .iter()
            .map(|asset| guard.get(asset).copied().unwrap_or(0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_defaults_missing_assets_to_zero() {
        let store = PriceStore::new();
        store.set(AssetId::Eth, 200_012_345).await;

        let snap = store.snapshot(&[AssetId::Btc, AssetId::Eth]).await;
        assert_eq!(snap, vec![0, 200_012_345]);
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let store = PriceStore::new();
        store.set(AssetId::Eth, 1).await;
        store.set(AssetId::Eth, 2).await;
        assert_eq!(store.snapshot(&[AssetId::Eth]).await, vec![2]);
    }
}
