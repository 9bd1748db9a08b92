use crate::asset::AssetId;

/// A single price observation from the off-chain aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub asset: AssetId,
    pub value: f64,
    pub timestamp: i64,
}

/// `round_or_truncate(value * 100_000)` — the chain-expected fixed-point
/// unit. Truncates, matching the original's `big.Float` → `Int64()`
/// conversion in `writer.go`.
pub fn to_fixed_point(value: f64) -> i64 {
    (value * 100_000.0).trunc() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_zero() {
        assert_eq!(to_fixed_point(0.0), 0);
    }

    #[test]
    fn scales_positive() {
        assert_eq!(to_fixed_point(2000.12345), 200_012_345);
    }

    #[test]
    fn scales_large() {
        assert_eq!(to_fixed_point(60000.9), 6_000_090_000);
    }

    #[test]
    fn truncates_small_fractional() {
        // 1.000009999 * 100_000 = 100000.9999, truncated to 100000
        assert_eq!(to_fixed_point(1.000_009_999), 100_000);
    }
}
