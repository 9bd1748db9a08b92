use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use domain::Quote;

use crate::model::{CoinAveragePriceRequest, DataReply, StatusReply};
use crate::TransportError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;

/// A single websocket JSON-RPC connection to the off-chain price
/// aggregator (spec §4.1). Subscriptions are multiplexed by numeric
/// request id over this one connection.
///
/// One `PriceFeedTransport` corresponds to one dial. Reconnection is the
/// caller's responsibility (`subscription::SubscriptionManager`
/// re-dials by constructing a fresh transport and re-sending every
/// registered subscription), matching spec §4.2's "re-dial, re-send"
/// wording.
pub struct PriceFeedTransport {
    write: Mutex<WsWriter>,
    sinks: Arc<Mutex<HashMap<u64, mpsc::Sender<Quote>>>>,
    resubscribe_tx: broadcast::Sender<()>,
    stop: CancellationToken,
    reader: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl PriceFeedTransport {
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| TransportError::Dial(e.to_string()))?;
        let (write, read) = stream.split();
        let (resubscribe_tx, _) = broadcast::channel(1);
        let sinks: Arc<Mutex<HashMap<u64, mpsc::Sender<Quote>>>> = Arc::new(Mutex::new(HashMap::new()));
        let stop = CancellationToken::new();

        let reader = spawn_reader(read, sinks.clone(), resubscribe_tx.clone(), stop.clone());

        Ok(PriceFeedTransport {
            write: Mutex::new(write),
            sinks,
            resubscribe_tx,
            stop,
            reader: Mutex::new(Some(reader)),
        })
    }

    /// Send a `coin_average_price` subscribe request and register `sink`
    /// under `id`. Future inbound frames for `id` are delivered to `sink`.
    pub async fn subscribe(
        &self,
        coins: Vec<String>,
        id: u64,
        frequency_ms: u64,
        sink: mpsc::Sender<Quote>,
    ) -> Result<(), TransportError> {
        let req = CoinAveragePriceRequest::new(id, coins, frequency_ms);
        let payload = serde_json::to_string(&req).map_err(|e| TransportError::Encode(e.to_string()))?;

        self.sinks.lock().await.insert(id, sink);

        let mut write = self.write.lock().await;
        write
            .send(Message::Text(payload))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))?;
        Ok(())
    }

    /// A broadcast receiver that fires once when the reader observes a
    /// connection failure. Consumed by `SubscriptionManager` to trigger a
    /// re-dial.
    pub fn resubscribe_signal(&self) -> broadcast::Receiver<()> {
        self.resubscribe_tx.subscribe()
    }

    pub async fn close(&self) {
        info!("closing ws client...");
        self.stop.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;
        if let Some(handle) = self.reader.lock().await.take() {
            handle.abort();
        }
    }
}

fn spawn_reader(
    mut read: futures_util::stream::SplitStream<WsStream>,
    sinks: Arc<Mutex<HashMap<u64, mpsc::Sender<Quote>>>>,
    resubscribe_tx: broadcast::Sender<()>,
    stop: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => {
                        info!("stop listen");
                        return;
                    }
                    frame = read.next() => {
                        match frame {
                            Some(Ok(Message::Text(text))) => {
                                handle_frame(&sinks, text.as_bytes()).await;
                            }
                            Some(Ok(Message::Binary(bytes))) => {
                                handle_frame(&sinks, &bytes).await;
                            }
                            Some(Ok(_)) => {
                                // ping/pong/close frames carry no price data
                            }
                            Some(Err(err)) => {
                                warn!(error = %err, "err from server");
                                let _ = resubscribe_tx.send(());
                                return;
                            }
                            None => {
                                warn!("server closed connection");
                                let _ = resubscribe_tx.send(());
                                return;
                            }
                        }
                    }
                }
            }
        })
}

async fn handle_frame(sinks: &Mutex<HashMap<u64, mpsc::Sender<Quote>>>, data: &[u8]) {
    if let Ok(status) = serde_json::from_slice::<StatusReply>(data) {
        if let Some(result) = &status.result {
            if !result.message.is_empty() {
                info!(id = status.id, method = %result.method, message = %result.message, "status reply");
                return;
            }
        }
    }

    if let Ok(reply) = serde_json::from_slice::<DataReply>(data) {
        if let Some(result) = reply.result {
            if result.timestamp != 0 {
                debug!(coin = %result.coin, value = result.value, "received data");
                let quote = Quote {
                    asset: domain::AssetId::from_feed_name(&result.coin),
                    value: result.value,
                    timestamp: result.timestamp,
                };
                let guard = sinks.lock().await;
                if let Some(sink) = guard.get(&reply.id) {
                    let _ = sink.send(quote).await;
                }
            }
        }
    }
}
