pub mod state;

pub use state::SchedulerState;

use std::sync::Arc;
use std::time::Duration;

use chain_client::{EpochOracle, Submitter};
use commit_reveal::{commit_hash, random_prime_130, sort_by_index, IndexedPrice};
use domain::{AssetCatalog, CommitRecord, EpochData, OracleError};
use ethers::types::Address;
use num_bigint::BigUint;
use price_feed::PriceStore;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const COMMIT_INTERVAL: Duration = Duration::from_secs(180);
const REVEAL_MAX_ATTEMPTS: u32 = 10;
const REVEAL_RETRY_UNIT: Duration = Duration::from_millis(500);
/// Threshold below which the first commit would land in the tail of the
/// current epoch rather than its own (spec §4.4 step 2).
const MIN_REMAINING_SECS: u64 = 60;
/// Extra slack added on top of `remaining` so the first commit lands
/// comfortably inside the next epoch's submit window.
const FIRST_EPOCH_SLACK_SECS: u64 = 90;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to read initial epoch: {0}")]
    InitialEpoch(#[source] domain::OracleError),
}

/// Drives the commit/reveal loop against a chain's FTSO epoch schedule
/// (spec §4.4). Grounded on the original implementation's `runSender`/
/// `reveal` pair in `internal/service/sender.go`: a ticker triggers commit,
/// and each successful commit spawns exactly one reveal task bound to its
/// own epoch snapshot.
pub struct CommitRevealScheduler {
    epoch_oracle: Arc<dyn EpochOracle>,
    submitter: Arc<dyn Submitter>,
    catalog: Arc<AssetCatalog>,
    store: Arc<PriceStore>,
    sender: Address,
    cancel: CancellationToken,
    state: Mutex<SchedulerState>,
}

impl CommitRevealScheduler {
    pub fn new(
        epoch_oracle: Arc<dyn EpochOracle>,
        submitter: Arc<dyn Submitter>,
        catalog: Arc<AssetCatalog>,
        store: Arc<PriceStore>,
        sender: Address,
    ) -> Self {
        CommitRevealScheduler {
            epoch_oracle,
            submitter,
            catalog,
            store,
            sender,
            cancel: CancellationToken::new(),
            state: Mutex::new(SchedulerState::Idle),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub async fn state(&self) -> SchedulerState {
        *self.state.lock().await
    }

    /// Runs until `stop()` is called. Blocks on the initial epoch read and
    /// optional startup backoff, then drives the 180s commit ticker.
    pub async fn run(&self) -> Result<(), SchedulerError> {
        let first_epoch = self
            .epoch_oracle
            .current_epoch()
            .await
            .map_err(|err| SchedulerError::InitialEpoch(oracle_error(err)))?;

        *self.state.lock().await = SchedulerState::WaitingFirstEpoch;

        let remaining = first_epoch.remaining_submit_secs();
        if remaining < MIN_REMAINING_SECS {
            let wait = Duration::from_secs(remaining + FIRST_EPOCH_SLACK_SECS);
            info!(wait_secs = wait.as_secs(), "delaying first commit into next epoch");
            if self.sleep_or_stop(wait).await {
                *self.state.lock().await = SchedulerState::Stopped;
                return Ok(());
            }
        }

        *self.state.lock().await = SchedulerState::Running;

        let mut ticker = interval_at(Instant::now() + COMMIT_INTERVAL, COMMIT_INTERVAL);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    *self.state.lock().await = SchedulerState::Stopped;
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.send().await;
                }
            }
        }
    }

    /// One commit tick: reads the epoch, snapshots prices, commits a hash,
    /// and on success spawns the matching reveal task. Never leaves a
    /// reveal scheduled for a commit that failed.
    async fn send(&self) {
        info!("commiting price");

        let epoch = match self.epoch_oracle.current_epoch().await {
            Ok(epoch) => epoch,
            Err(err) => {
                warn!(error = %err, "err get epoch");
                return;
            }
        };

        let assets = self.catalog.assets();
        let prices = self.store.snapshot(&assets).await;
        let random = match random_prime_130() {
            Ok(random) => random,
            Err(err) => {
                warn!(error = %err, "err generate random");
                return;
            }
        };

        let indexed: Vec<IndexedPrice> = self
            .catalog
            .entries()
            .iter()
            .zip(prices.iter())
            .map(|(entry, &price)| IndexedPrice {
                asset: entry.id,
                chain_index: entry.chain_index,
                price,
            })
            .collect();
        let sorted = sort_by_index(indexed);

        let hash = match commit_hash(&sorted, &random, self.sender) {
            Ok(hash) => hash,
            Err(err) => {
                warn!(error = %err, "err build commit hash");
                return;
            }
        };

        if let Err(err) = self.submitter.submit_hash(epoch.epoch_id, hash).await {
            warn!(error = %err, "err commit prices, skipping tick");
            return;
        }

        let sleep_secs = epoch.reveal_delay_secs();
        info!(epoch_id = epoch.epoch_id, sleep_secs, "time for reveal");

        // One outstanding CommitRecord per epoch (spec §3 invariant): the
        // reveal task below resolves exactly this commit's captured
        // assets/prices/random, never a later snapshot.
        let record = CommitRecord {
            epoch_id: epoch.epoch_id,
            assets: sorted.iter().map(|item| item.asset).collect(),
            prices: sorted.iter().map(|item| item.price).collect(),
            random,
        };

        let submitter = self.submitter.clone();
        let catalog = self.catalog.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(reveal_task(
            submitter,
            catalog,
            cancel,
            record,
            Duration::from_secs(sleep_secs),
        ));
    }

    async fn sleep_or_stop(&self, dur: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => true,
            _ = tokio::time::sleep(dur) => false,
        }
    }
}

fn oracle_error(err: chain_client::ChainClientError) -> OracleError {
    OracleError::Chain(err.to_string())
}

async fn reveal_task(
    submitter: Arc<dyn Submitter>,
    catalog: Arc<AssetCatalog>,
    cancel: CancellationToken,
    record: CommitRecord,
    sleep: Duration,
) {
    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(sleep) => {}
    }
    if cancel.is_cancelled() {
        return;
    }

    let epoch_id = record.epoch_id;
    info!(epoch_id, "revealing price");

    // The catalog is immutable after bootstrap, so re-resolving each
    // asset's chain index here yields the exact same indices used to
    // build the commit hash (spec §3's "identical ordering" invariant).
    let indices: Vec<i128> = record
        .assets
        .iter()
        .map(|&asset| catalog.by_id(asset).map(|e| e.chain_index).unwrap_or(-1))
        .collect();

    for attempt in 0..REVEAL_MAX_ATTEMPTS {
        if attempt > 0 {
            let delay = REVEAL_RETRY_UNIT * attempt;
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        match submitter
            .reveal_prices(epoch_id, &indices, &record.prices, &record.random)
            .await
        {
            Ok(()) => return,
            Err(err) => {
                warn!(epoch_id, attempt, error = %err, "err reveal");
            }
        }
    }

    warn!(epoch_id, "reveal abandoned after max attempts");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domain::AssetId;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct MockOracle {
        epoch: EpochData,
    }

    #[async_trait]
    impl EpochOracle for MockOracle {
        async fn current_epoch(&self) -> chain_client::ChainResult<EpochData> {
            Ok(self.epoch.clone())
        }
    }

    struct CountingSubmitter {
        commit_calls: AtomicU32,
        reveal_calls: AtomicU32,
        fail_reveals: u32,
    }

    #[async_trait]
    impl Submitter for CountingSubmitter {
        async fn submit_hash(
            &self,
            _epoch_id: u64,
            _hash: [u8; 32],
        ) -> chain_client::ChainResult<()> {
            self.commit_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn reveal_prices(
            &self,
            _epoch_id: u64,
            _indices: &[i128],
            _prices: &[i64],
            _random: &BigUint,
        ) -> chain_client::ChainResult<()> {
            let call = self.reveal_calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_reveals {
                return Err(chain_client::ChainClientError::Call("mock failure".into()));
            }
            Ok(())
        }
    }

    fn scheduler_with(
        epoch: EpochData,
        fail_reveals: u32,
    ) -> (Arc<CommitRevealScheduler>, Arc<CountingSubmitter>) {
        let oracle = Arc::new(MockOracle { epoch });
        let submitter = Arc::new(CountingSubmitter {
            commit_calls: AtomicU32::new(0),
            reveal_calls: AtomicU32::new(0),
            fail_reveals,
        });
        let catalog = Arc::new(AssetCatalog::unresolved(&[AssetId::Eth, AssetId::Btc], false)
            .with_resolved_indices(&[0, 1], &["ETH".into(), "BTC".into()]));
        let store = Arc::new(PriceStore::new());
        let scheduler = Arc::new(CommitRevealScheduler::new(
            oracle,
            submitter.clone(),
            catalog,
            store,
            Address::zero(),
        ));
        (scheduler, submitter)
    }

    #[tokio::test(start_paused = true)]
    async fn failed_commit_never_schedules_reveal() {
        struct FailingSubmitter;
        #[async_trait]
        impl Submitter for FailingSubmitter {
            async fn submit_hash(
                &self,
                _epoch_id: u64,
                _hash: [u8; 32],
            ) -> chain_client::ChainResult<()> {
                Err(chain_client::ChainClientError::Call("rpc down".into()))
            }
            async fn reveal_prices(
                &self,
                _epoch_id: u64,
                _indices: &[i128],
                _prices: &[i64],
                _random: &BigUint,
            ) -> chain_client::ChainResult<()> {
                panic!("reveal must not be called after a failed commit");
            }
        }

        let oracle = Arc::new(MockOracle {
            epoch: EpochData {
                epoch_id: 1,
                start_ts: 1000,
                end_ts: 1180,
                reveal_end_ts: 1270,
                now_ts: 1000,
            },
        });
        let catalog = Arc::new(AssetCatalog::unresolved(&[AssetId::Eth], false)
            .with_resolved_indices(&[0], &["ETH".into()]));
        let store = Arc::new(PriceStore::new());
        let scheduler = CommitRevealScheduler::new(
            oracle,
            Arc::new(FailingSubmitter),
            catalog,
            store,
            Address::zero(),
        );

        scheduler.send().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_retries_with_backoff_then_succeeds() {
        let epoch = EpochData {
            epoch_id: 7,
            start_ts: 1000,
            end_ts: 1180,
            reveal_end_ts: 1270,
            now_ts: 1000,
        };
        let (scheduler, submitter) = scheduler_with(epoch, 3);

        scheduler.send().await;
        assert_eq!(submitter.commit_calls.load(Ordering::SeqCst), 1);

        for _ in 0..50 {
            tokio::time::advance(Duration::from_secs(5)).await;
            tokio::task::yield_now().await;
        }

        assert!(submitter.reveal_calls.load(Ordering::SeqCst) >= 4);
    }

    #[test]
    fn epoch_helpers_compute_startup_backoff() {
        let epoch = EpochData {
            epoch_id: 42,
            start_ts: 1000,
            end_ts: 1180,
            reveal_end_ts: 1270,
            now_ts: 1150,
        };
        assert_eq!(epoch.remaining_submit_secs(), 30);
        assert!(epoch.remaining_submit_secs() < MIN_REMAINING_SECS);
    }
}
