use serde::{Deserialize, Serialize};

/// `coin_average_price` subscribe request (spec §6).
#[derive(Debug, Clone, Serialize)]
pub struct CoinAveragePriceRequest {
    pub id: u64,
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: CoinAveragePriceParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoinAveragePriceParams {
    pub coins: Vec<String>,
    pub frequency_ms: u64,
}

impl CoinAveragePriceRequest {
    pub fn new(id: u64, coins: Vec<String>, frequency_ms: u64) -> Self {
        CoinAveragePriceRequest {
            id,
            jsonrpc: "2.0",
            method: "coin_average_price",
            params: CoinAveragePriceParams { coins, frequency_ms },
        }
    }
}

/// A status reply: `{id, result:{message, method}}`. Tried first against
/// every inbound frame; a non-empty `message` is logged and the frame is
/// considered consumed (spec §4.1).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatusReply {
    pub id: u64,
    pub result: Option<StatusResult>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatusResult {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub method: String,
}

/// A data reply: `{id, result:{coin, method, timestamp, value}}`. Tried
/// second; delivered as a `Quote` when `timestamp != 0`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DataReply {
    pub id: u64,
    pub result: Option<DataResult>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DataResult {
    pub coin: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub timestamp: i64,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_expected_shape() {
        let req = CoinAveragePriceRequest::new(7, vec!["ETH".into(), "BTC".into()], 90_000);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "coin_average_price");
        assert_eq!(json["params"]["coins"], serde_json::json!(["ETH", "BTC"]));
        assert_eq!(json["params"]["frequency_ms"], 90_000);
    }

    #[test]
    fn data_reply_parses() {
        let raw = r#"{"id":1,"result":{"coin":"ETH","method":"coin_average_price","timestamp":1000,"value":2000.5}}"#;
        let reply: DataReply = serde_json::from_str(raw).unwrap();
        assert_eq!(reply.id, 1);
        assert_eq!(reply.result.unwrap().coin, "ETH");
    }

    #[test]
    fn status_reply_parses() {
        let raw = r#"{"id":1,"result":{"message":"subscribed","method":"coin_average_price"}}"#;
        let reply: StatusReply = serde_json::from_str(raw).unwrap();
        assert_eq!(reply.result.unwrap().message, "subscribed");
    }
}
