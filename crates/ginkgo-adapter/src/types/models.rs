/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::{Granularity, OrderType, Side};
use super::serde_helpers;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub instrument: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub pip: Option<Decimal>,
    #[serde(default)]
    pub max_trade_units: Option<u64>,
    #[serde(default)]
    pub precision: Option<String>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub max_trailing_stop: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub min_trailing_stop: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub margin_rate: Option<Decimal>,
    #[serde(default)]
    pub halted: Option<bool>,
}

/// Current quote for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub instrument: String,
    pub time: DateTime<Utc>,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub bid: Decimal,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub ask: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Price {
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }

    pub fn is_halted(&self) -> bool {
        self.status.as_deref() == Some("halted")
    }
}

/// One candle; midpoint candles fill the `*_mid` fields, bid/ask candles the rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub time: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub open_mid: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub high_mid: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub low_mid: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub close_mid: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub open_bid: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub open_ask: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub high_bid: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub high_ask: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub low_bid: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub low_ask: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub close_bid: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub close_ask: Option<Decimal>,
    pub volume: u64,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candles {
    pub instrument: String,
    pub granularity: Granularity,
    pub candles: Vec<Candle>,
}

/// Entry of the account list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub account_id: u64,
    pub account_name: String,
    pub account_currency: String,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub margin_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: u64,
    pub account_name: String,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub balance: Decimal,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub unrealized_pl: Decimal,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub realized_pl: Decimal,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub margin_used: Decimal,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub margin_avail: Decimal,
    pub open_trades: u32,
    pub open_orders: u32,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub margin_rate: Decimal,
    pub account_currency: String,
}

/// Credentials of an account created in the sandbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAccount {
    pub username: String,
    pub password: String,
    pub account_id: u64,
}

/// Pending order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub instrument: String,
    pub units: u64,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub time: DateTime<Utc>,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub price: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub take_profit: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub stop_loss: Decimal,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub upper_bound: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub lower_bound: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub trailing_stop: Decimal,
}

/// Open trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: u64,
    pub units: u64,
    pub side: Side,
    pub instrument: String,
    pub time: DateTime<Utc>,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub price: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub take_profit: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub stop_loss: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub trailing_stop: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub trailing_amount: Decimal,
}

/// Result of closing a trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub id: u64,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub price: Decimal,
    pub instrument: String,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub profit: Decimal,
    pub side: Side,
    pub time: DateTime<Utc>,
}

/// Net position in one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub instrument: String,
    pub units: u64,
    pub side: Side,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub avg_price: Decimal,
}

/// Result of closing a position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedPosition {
    pub ids: Vec<u64>,
    pub instrument: String,
    pub total_units: u64,
    #[serde(
        deserialize_with = "serde_helpers::deserialize_decimal",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub price: Decimal,
}

/// Order opened by a create-order call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedOrder {
    pub id: u64,
    pub units: u64,
    pub side: Side,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub take_profit: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub stop_loss: Decimal,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub upper_bound: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub lower_bound: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub trailing_stop: Decimal,
}

/// Trade opened by a market order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedTrade {
    pub id: u64,
    pub units: u64,
    pub side: Side,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub take_profit: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub stop_loss: Decimal,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_or_zero",
        serialize_with = "serde_helpers::serialize_decimal"
    )]
    pub trailing_stop: Decimal,
}

/// Trade closed or reduced as a side effect of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeFill {
    pub id: u64,
    pub units: u64,
    pub side: Side,
}

/// Account activity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: u64,
    pub account_id: u64,
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub pl: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub interest: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_balance: Option<Decimal>,
    /// Type-specific fields not modelled above
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
