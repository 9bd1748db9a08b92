use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use domain::{to_fixed_point, AssetCatalog, Quote};

use crate::store::PriceStore;
use crate::transport::PriceFeedTransport;
use crate::TransportError;

const SUBSCRIBE_RETRY_DELAY: Duration = Duration::from_secs(5);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const QUOTE_CHANNEL_CAPACITY: usize = 256;

/// Owns the lifetime of the websocket connection to the off-chain price
/// aggregator: dials, subscribes to every configured asset's feed name,
/// writes incoming quotes into a `PriceStore`, and re-dials on the
/// transport's resubscribe signal.
///
/// Mirrors the original implementation's split between `client.go`'s raw
/// `wsClient` (pure I/O, no reconnect policy) and
/// `coinAveragePriceSender.go`/`writer.go`'s service layer, which owns the
/// `resubscribe` channel and re-issues `subscribeCoinAveragePrice` after a
/// re-dial. Here that service layer is `SubscriptionManager`; the raw I/O
/// layer is `transport::PriceFeedTransport`.
pub struct SubscriptionManager {
    url: String,
    catalog: Arc<AssetCatalog>,
    store: Arc<PriceStore>,
    frequency_ms: u64,
    next_id: AtomicU64,
    cancel: CancellationToken,
}

impl SubscriptionManager {
    pub fn new(
        url: impl Into<String>,
        catalog: Arc<AssetCatalog>,
        store: Arc<PriceStore>,
        frequency_ms: u64,
    ) -> Self {
        SubscriptionManager {
            url: url.into(),
            catalog,
            store,
            frequency_ms,
            next_id: AtomicU64::new(1),
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Runs until `stop()` is called. Dials, subscribes every configured
    /// feed name under one request id, and forwards quotes into the price
    /// store. On a transport error it waits and re-dials, repeating the
    /// subscribe call with the same parameters, forever.
    pub async fn run(&self) {
        let coins: Vec<String> = self
            .catalog
            .assets()
            .iter()
            .map(|asset| asset.feed_name().to_string())
            .collect();

        if coins.is_empty() {
            warn!("no assets configured, nothing to subscribe to");
            return;
        }

        loop {
            if self.cancel.is_cancelled() {
                return;
            }

            let transport = match PriceFeedTransport::connect(&self.url).await {
                Ok(t) => t,
                Err(err) => {
                    warn!(error = %err, "dial failed, retrying");
                    if self.sleep_or_stop(RECONNECT_DELAY).await {
                        return;
                    }
                    continue;
                }
            };

            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let (quote_tx, mut quote_rx) = mpsc::channel::<Quote>(QUOTE_CHANNEL_CAPACITY);

            if !self
                .subscribe_with_retry(&transport, coins.clone(), id, quote_tx.clone())
                .await
            {
                transport.close().await;
                return;
            }

            info!(id, coins = ?coins, "subscribed to coin_average_price");

            let mut resubscribe = transport.resubscribe_signal();
            loop {
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        transport.close().await;
                        return;
                    }
                    _ = resubscribe.recv() => {
                        warn!("transport signalled resubscribe, re-dialing");
                        break;
                    }
                    quote = quote_rx.recv() => {
                        match quote {
                            Some(quote) => self.handle_quote(quote).await,
                            None => break,
                        }
                    }
                }
            }

            transport.close().await;
            if self.sleep_or_stop(RECONNECT_DELAY).await {
                return;
            }
        }
    }

    /// Subscribes, retrying every `SUBSCRIBE_RETRY_DELAY` on a write
    /// failure, until it succeeds or `stop()` is called (in which case this
    /// returns `false`).
    async fn subscribe_with_retry(
        &self,
        transport: &PriceFeedTransport,
        coins: Vec<String>,
        id: u64,
        sink: mpsc::Sender<Quote>,
    ) -> bool {
        loop {
            match transport
                .subscribe(coins.clone(), id, self.frequency_ms, sink.clone())
                .await
            {
                Ok(()) => return true,
                Err(TransportError::Write(msg)) => {
                    warn!(error = %msg, "subscribe write failed, retrying in 5s");
                    if self.sleep_or_stop(SUBSCRIBE_RETRY_DELAY).await {
                        return false;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "subscribe failed, retrying in 5s");
                    if self.sleep_or_stop(SUBSCRIBE_RETRY_DELAY).await {
                        return false;
                    }
                }
            }
        }
    }

    async fn handle_quote(&self, quote: Quote) {
        if self.catalog.by_id(quote.asset).is_none() {
            warn!(asset = %quote.asset, "dropping quote for unknown or unconfigured asset");
            return;
        }
        let fixed = to_fixed_point(quote.value);
        self.store.set(quote.asset, fixed).await;
    }

    /// Sleeps for `dur` unless cancelled first. Returns `true` if cancelled.
    async fn sleep_or_stop(&self, dur: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => true,
            _ = tokio::time::sleep(dur) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::AssetId;

    #[tokio::test]
    async fn handle_quote_drops_unconfigured_asset() {
        let catalog = Arc::new(AssetCatalog::unresolved(&[AssetId::Eth], false));
        let store = Arc::new(PriceStore::new());
        let manager = SubscriptionManager::new("ws://localhost:0", catalog, store.clone(), 90_000);

        manager
            .handle_quote(Quote {
                asset: AssetId::Btc,
                value: 50_000.0,
                timestamp: 1,
            })
            .await;

        assert_eq!(store.snapshot(&[AssetId::Btc]).await, vec![0]);
    }

    #[tokio::test]
    async fn handle_quote_stores_fixed_point_value() {
        let catalog = Arc::new(AssetCatalog::unresolved(&[AssetId::Eth], false));
        let store = Arc::new(PriceStore::new());
        let manager = SubscriptionManager::new("ws://localhost:0", catalog, store.clone(), 90_000);

        manager
            .handle_quote(Quote {
                asset: AssetId::Eth,
                value: 2000.5,
                timestamp: 1,
            })
            .await;

        assert_eq!(store.snapshot(&[AssetId::Eth]).await, vec![200_050_000]);
    }
}
