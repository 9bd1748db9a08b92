pub mod model;
pub mod store;
pub mod subscription;
pub mod transport;

pub use store::PriceStore;
pub use subscription::SubscriptionManager;
pub use transport::PriceFeedTransport;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to dial price feed: {0}")]
    Dial(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error("failed to write to socket: {0}")]
    Write(String),
}
