use std::fmt;

/// A supported price-feed asset, or the sentinel for anything not in the
/// configured set.
///
/// Variant order matters: it is the order new-to-old callers rely on when
/// building `AssetCatalog::all()` and therefore the default iteration order
/// used to build commit snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetId {
    Ada,
    Algo,
    Arb,
    Avax,
    Bnb,
    Btc,
    Doge,
    Eth,
    Fil,
    Flr,
    Ltc,
    Matic,
    Sol,
    Usdc,
    Usdt,
    Xdc,
    Xlm,
    Xrp,
    Unknown,
}

impl AssetId {
    /// All known assets, in a fixed canonical order. `Unknown` is excluded —
    /// it is never a member of a configured asset set.
    pub const ALL: [AssetId; 18] = [
        AssetId::Ada,
        AssetId::Algo,
        AssetId::Arb,
        AssetId::Avax,
        AssetId::Bnb,
        AssetId::Btc,
        AssetId::Doge,
        AssetId::Eth,
        AssetId::Fil,
        AssetId::Flr,
        AssetId::Ltc,
        AssetId::Matic,
        AssetId::Sol,
        AssetId::Usdc,
        AssetId::Usdt,
        AssetId::Xdc,
        AssetId::Xlm,
        AssetId::Xrp,
    ];

    /// The identifier used against the off-chain aggregator's
    /// `coin_average_price` subscription (the WS "coin" name).
    pub fn feed_name(self) -> &'static str {
        match self {
            AssetId::Ada => "ADA",
            AssetId::Algo => "ALGO",
            AssetId::Arb => "ARB",
            AssetId::Avax => "AVAX",
            AssetId::Bnb => "BNB",
            AssetId::Btc => "BTC",
            AssetId::Doge => "DOGE",
            AssetId::Eth => "ETH",
            AssetId::Fil => "FIL",
            AssetId::Flr => "FLR",
            AssetId::Ltc => "LTC",
            AssetId::Matic => "MATIC",
            AssetId::Sol => "SOL",
            AssetId::Usdc => "USDC",
            AssetId::Usdt => "USDT",
            AssetId::Xdc => "XDC",
            AssetId::Xlm => "XLM",
            AssetId::Xrp => "XRP",
            AssetId::Unknown => "UnknownToken",
        }
    }

    /// The on-chain symbol, as registered with `FtsoRegistry`. Identical to
    /// `feed_name` except on test networks, where the registry prefixes
    /// every symbol with `test` (see `AssetCatalog::resolve`).
    pub fn base_chain_symbol(self) -> &'static str {
        self.feed_name()
    }

    pub fn from_feed_name(name: &str) -> AssetId {
        AssetId::ALL
            .into_iter()
            .find(|a| a.feed_name().eq_ignore_ascii_case(name))
            .unwrap_or(AssetId::Unknown)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.feed_name())
    }
}

/// One asset's resolved on-chain identity, built once at startup.
#[derive(Debug, Clone)]
pub struct AssetEntry {
    pub id: AssetId,
    pub feed_name: String,
    /// Possibly `test`-prefixed symbol as registered on-chain.
    pub chain_symbol: String,
    /// The on-chain FTSO index. `-1` until resolved against the registry.
    pub chain_index: i128,
}

/// An immutable table of configured assets and their resolved chain
/// indices, built once during bootstrap and shared by reference.
///
/// This replaces the original implementation's mutable package-level
/// arrays (`tokenIDs.go`'s `var TokenIDIndices = []*big.Int{...}`, mutated
/// in place by `FillTokenIDAndNames`): here the table is constructed once
/// and never mutated again.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    entries: Vec<AssetEntry>,
}

impl AssetCatalog {
    /// Build a catalog for the given assets, with every chain index
    /// unresolved (`-1`). Call `with_resolved_indices` once the registry
    /// lookup completes.
    pub fn unresolved(assets: &[AssetId], is_testnet: bool) -> Self {
        let entries = assets
            .iter()
            .map(|&id| AssetEntry {
                id,
                feed_name: id.feed_name().to_string(),
                chain_symbol: if is_testnet {
                    format!("test{}", id.base_chain_symbol())
                } else {
                    id.base_chain_symbol().to_string()
                },
                chain_index: -1,
            })
            .collect();
        AssetCatalog { entries }
    }

    /// Produce a new catalog with chain indices filled in from an on-chain
    /// `(indices, symbols)` pair, as returned by
    /// `FtsoRegistry.getSupportedIndicesAndSymbols`.
    pub fn with_resolved_indices(&self, indices: &[i128], symbols: &[String]) -> AssetCatalog {
        let mut entries = self.entries.clone();
        for entry in &mut entries {
            if let Some(pos) = symbols.iter().position(|s| s == &entry.chain_symbol) {
                entry.chain_index = indices[pos];
            }
        }
        AssetCatalog { entries }
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    pub fn assets(&self) -> Vec<AssetId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn by_id(&self, id: AssetId) -> Option<&AssetEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn by_feed_name(&self, name: &str) -> Option<&AssetEntry> {
        self.entries
            .iter()
            .find(|e| e.feed_name.eq_ignore_ascii_case(name))
    }

    /// `true` once every configured asset has a non-negative chain index.
    pub fn fully_resolved(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| e.chain_index >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_catalog_has_negative_indices() {
        let cat = AssetCatalog::unresolved(&[AssetId::Eth, AssetId::Btc], false);
        assert!(!cat.fully_resolved());
        assert_eq!(cat.by_id(AssetId::Eth).unwrap().chain_index, -1);
    }

    #[test]
    fn testnet_prefixes_chain_symbol() {
        let cat = AssetCatalog::unresolved(&[AssetId::Eth], true);
        assert_eq!(cat.by_id(AssetId::Eth).unwrap().chain_symbol, "testETH");
    }

    #[test]
    fn resolve_fills_matching_symbols_only() {
        let cat = AssetCatalog::unresolved(&[AssetId::Eth, AssetId::Btc], false);
        let resolved = cat.with_resolved_indices(&[7, 3], &["BTC".to_string(), "ETH".to_string()]);
        assert_eq!(resolved.by_id(AssetId::Btc).unwrap().chain_index, 7);
        assert_eq!(resolved.by_id(AssetId::Eth).unwrap().chain_index, 3);
        assert!(resolved.fully_resolved());
    }

    #[test]
    fn unknown_feed_name_maps_to_unknown_asset() {
        assert_eq!(AssetId::from_feed_name("DOGE2"), AssetId::Unknown);
        assert_eq!(AssetId::from_feed_name("eth"), AssetId::Eth);
    }
}
