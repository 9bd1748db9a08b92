use std::fmt;

/// The EVM chain the agent is configured to submit to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainId {
    Flare,
    Coston2,
    Songbird,
    Unknown,
}

impl ChainId {
    pub fn from_u64(id: u64) -> ChainId {
        match id {
            14 => ChainId::Flare,
            114 => ChainId::Coston2,
            19 => ChainId::Songbird,
            _ => ChainId::Unknown,
        }
    }

    pub fn id(self) -> u64 {
        match self {
            ChainId::Flare => 14,
            ChainId::Coston2 => 114,
            ChainId::Songbird => 19,
            ChainId::Unknown => 0,
        }
    }

    /// Coston2 is Flare's testnet: its FTSO registry prefixes every symbol
    /// with `test` (`tokenIDs.go`'s `FillTokenIDAndNames`). Flare and
    /// Songbird are production networks and use bare symbols.
    pub fn is_testnet(self) -> bool {
        matches!(self, ChainId::Coston2)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChainId::Flare => "FlareChain",
            ChainId::Coston2 => "Coston2Chain",
            ChainId::Songbird => "SongbirdChain",
            ChainId::Unknown => "UnknownChain",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_ids() {
        assert_eq!(ChainId::from_u64(14), ChainId::Flare);
        assert_eq!(ChainId::from_u64(114), ChainId::Coston2);
        assert_eq!(ChainId::from_u64(19), ChainId::Songbird);
        assert_eq!(ChainId::from_u64(1), ChainId::Unknown);
    }

    #[test]
    fn testnets_flagged() {
        assert!(ChainId::Coston2.is_testnet());
        assert!(!ChainId::Songbird.is_testnet());
        assert!(!ChainId::Flare.is_testnet());
    }
}
