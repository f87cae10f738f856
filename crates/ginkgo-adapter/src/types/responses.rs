/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::serde_helpers;
use super::models::{
    AccountSummary, Instrument, OpenedOrder, OpenedTrade, Order, Position, Price, Trade,
    TradeFill, Transaction,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentsResponse {
    pub instruments: Vec<Instrument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricesResponse {
    pub prices: Vec<Price>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsResponse {
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradesResponse {
    pub trades: Vec<Trade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionsResponse {
    pub positions: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

/// Outcome of a create-order call
///
/// A market order fills at once and reports the trades it opened, closed or
/// reduced; any other order type reports the pending order it opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub instrument: String,
    pub time: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::deserialize_decimal_opt",
        serialize_with = "serde_helpers::serialize_decimal_opt"
    )]
    pub price: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::empty_object_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub order_opened: Option<OpenedOrder>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::empty_object_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub trade_opened: Option<OpenedTrade>,
    #[serde(default)]
    pub trades_closed: Vec<TradeFill>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::empty_object_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub trade_reduced: Option<TradeFill>,
}

impl OrderResponse {
    /// True when the order filled immediately
    pub fn is_filled(&self) -> bool {
        self.trade_opened.is_some() || !self.trades_closed.is_empty() || self.trade_reduced.is_some()
    }
}
