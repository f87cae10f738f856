/*
[INPUT]:  One decoded JSON line from a rates or events stream
[OUTPUT]: StreamMessage variants and channel events
[POS]:    Stream layer - message classification
[UPDATE]: When the stream adds message kinds
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::http::OandaError;
use crate::types::{Price, Transaction};

/// Price update on the rates stream
pub type Tick = Price;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub time: DateTime<Utc>,
}

/// Which feed a stream connects to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Rates,
    Events,
}

impl StreamKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            StreamKind::Rates => "v1/prices",
            StreamKind::Events => "v1/events",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamKind::Rates => "rates",
            StreamKind::Events => "events",
        })
    }
}

/// One line of a stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Tick(Tick),
    Heartbeat(Heartbeat),
    Transaction(Box<Transaction>),
    /// Anything the adapter does not model, including lines whose known
    /// payload failed to decode
    Other(Value),
}

impl StreamMessage {
    /// Classify a line by its single top-level key
    pub fn from_value(value: Value) -> Self {
        let decoded = if let Some(inner) = value.get("tick") {
            serde_json::from_value(inner.clone()).ok().map(StreamMessage::Tick)
        } else if let Some(inner) = value.get("heartbeat") {
            serde_json::from_value(inner.clone()).ok().map(StreamMessage::Heartbeat)
        } else if let Some(inner) = value.get("transaction") {
            serde_json::from_value(inner.clone())
                .ok()
                .map(|transaction| StreamMessage::Transaction(Box::new(transaction)))
        } else {
            None
        };
        decoded.unwrap_or(StreamMessage::Other(value))
    }

    pub fn is_heartbeat(&self) -> bool {
        match self {
            StreamMessage::Heartbeat(_) => true,
            StreamMessage::Other(value) => value.get("heartbeat").is_some(),
            _ => false,
        }
    }
}

/// Item delivered to a channel-backed stream consumer
#[derive(Debug)]
pub enum StreamEvent {
    Message(StreamKind, StreamMessage),
    Error(StreamKind, OandaError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tick_line() {
        let message = StreamMessage::from_value(json!({
            "tick": {
                "instrument": "AUD_CAD",
                "time": "2014-01-30T20:47:08.066398Z",
                "bid": 0.98114,
                "ask": 0.98139
            }
        }));
        match message {
            StreamMessage::Tick(tick) => assert_eq!(tick.instrument, "AUD_CAD"),
            other => panic!("Expected tick, got {other:?}"),
        }
    }

    #[test]
    fn test_heartbeat_line() {
        let message = StreamMessage::from_value(json!({
            "heartbeat": { "time": "2014-01-30T20:47:11.384761Z" }
        }));
        assert!(message.is_heartbeat());
        assert!(matches!(message, StreamMessage::Heartbeat(_)));
    }

    #[test]
    fn test_malformed_heartbeat_is_still_heartbeat() {
        let message = StreamMessage::from_value(json!({ "heartbeat": { "time": "1391114831384761" } }));
        assert!(matches!(message, StreamMessage::Other(_)));
        assert!(message.is_heartbeat());
    }

    #[test]
    fn test_transaction_line() {
        let message = StreamMessage::from_value(json!({
            "transaction": {
                "id": 10002,
                "accountId": 234567,
                "time": "2014-04-07T18:31:05Z",
                "type": "MARKET_ORDER_CREATE",
                "instrument": "EUR_USD",
                "units": 2,
                "side": "buy",
                "price": 1.25325
            }
        }));
        match message {
            StreamMessage::Transaction(transaction) => assert_eq!(transaction.id, 10002),
            other => panic!("Expected transaction, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_line() {
        let message = StreamMessage::from_value(json!({ "disconnect": { "code": 64 } }));
        assert!(matches!(message, StreamMessage::Other(_)));
        assert!(!message.is_heartbeat());
        assert_eq!(StreamKind::Events.endpoint(), "v1/events");
        assert_eq!(StreamKind::Rates.to_string(), "rates");
    }
}
