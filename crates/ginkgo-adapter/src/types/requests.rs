/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::{CandleFormat, Granularity, OrderType, Side};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruments: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricesQuery {
    pub instruments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
}

impl PricesQuery {
    pub fn new<I, S>(instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            instruments: instruments.into_iter().map(Into::into).collect(),
            since: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlesQuery {
    pub instrument: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granularity: Option<Granularity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candle_format: Option<CandleFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_first: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_alignment: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_alignment: Option<String>,
}

impl CandlesQuery {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Paging filter shared by the order and trade listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<u64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub instrument: String,
    pub units: u64,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_stop: Option<Decimal>,
}

impl CreateOrderRequest {
    pub fn market(instrument: impl Into<String>, units: u64, side: Side) -> Self {
        Self {
            instrument: instrument.into(),
            units,
            side,
            order_type: OrderType::Market,
            expiry: None,
            price: None,
            lower_bound: None,
            upper_bound: None,
            stop_loss: None,
            take_profit: None,
            trailing_stop: None,
        }
    }

    /// Pending order; limit, stop and marketIfTouched orders need a price and expiry
    pub fn pending(
        instrument: impl Into<String>,
        units: u64,
        side: Side,
        order_type: OrderType,
        price: Decimal,
        expiry: DateTime<Utc>,
    ) -> Self {
        Self {
            order_type,
            price: Some(price),
            expiry: Some(expiry),
            ..Self::market(instrument, units, side)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_stop: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyTradeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_stop: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<u64>>,
}

/// Filter for the Forex Labs endpoints; `period` is in seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
}

impl LabsQuery {
    pub fn new(instrument: impl Into<String>, period: u64) -> Self {
        Self {
            instrument: Some(instrument.into()),
            period: Some(period),
            unique: None,
        }
    }
}

/// Parameters of a rates or events stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u64>,
    /// Rates stream only
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub instruments: Vec<String>,
    /// Events stream only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_ids: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Drop heartbeat lines before they reach the handler; never sent upstream
    #[serde(skip)]
    pub ignore_heartbeat: bool,
}

impl StreamQuery {
    pub fn rates<I, S>(account_id: u64, instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            account_id: Some(account_id),
            instruments: instruments.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn events(account_ids: Vec<u64>) -> Self {
        Self {
            account_ids: Some(account_ids),
            ..Self::default()
        }
    }

    pub fn ignore_heartbeat(mut self, ignore: bool) -> Self {
        self.ignore_heartbeat = ignore;
        self
    }
}
