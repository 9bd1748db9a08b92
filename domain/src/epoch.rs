/// Current on-chain price-epoch state, as returned by
/// `FtsoManager.getCurrentPriceEpochData`.
///
/// Invariant: `start_ts < now_ts <= end_ts <= reveal_end_ts`. Callers that
/// construct this directly (tests, mocks) are expected to uphold it; the
/// live `chain_client::epoch::OnChainEpochOracle` never returns a value
/// that violates it because the values come straight from the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochData {
    pub epoch_id: u64,
    pub start_ts: u64,
    pub end_ts: u64,
    pub reveal_end_ts: u64,
    pub now_ts: u64,
}

impl EpochData {
    /// Seconds remaining until the submit window closes. Saturates at zero
    /// rather than underflowing if `now_ts` has already passed `end_ts`.
    pub fn remaining_submit_secs(&self) -> u64 {
        self.end_ts.saturating_sub(self.now_ts)
    }

    /// Seconds until 60s before the reveal window closes — the scheduler's
    /// reveal-timer delay (spec §4.4 step 4). Saturates at zero.
    pub fn reveal_delay_secs(&self) -> u64 {
        self.reveal_end_ts
            .saturating_sub(self.now_ts)
            .saturating_sub(60)
    }
}
