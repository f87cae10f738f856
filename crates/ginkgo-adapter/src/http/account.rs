/*
[INPUT]:  Shared OandaApi plus one account id
[OUTPUT]: Account-scoped calls and string error replies
[POS]:    HTTP layer - account wrapper over the shared request queue
[UPDATE]: When account-scoped endpoints are added to OandaApi
*/

use std::sync::Arc;

use serde_json::Value;

use crate::http::{OandaApi, PendingResponse, Result};
use crate::types::{
    Account, ClosedPosition, ClosedTrade, CreateOrderRequest, InstrumentsQuery, InstrumentsResponse,
    ListQuery, ModifyOrderRequest, ModifyTradeRequest, Order, OrderResponse, OrdersResponse, Position,
    PositionsResponse, Trade, TradesResponse, Transaction, TransactionsQuery, TransactionsResponse,
};

/// View of one trading account over a shared [`OandaApi`].
///
/// Calls go through the API's request queue, so ordering with other callers
/// of the same API is preserved.
#[derive(Debug, Clone)]
pub struct AccountSession {
    api: Arc<OandaApi>,
    account_id: u64,
}

impl AccountSession {
    pub fn new(api: Arc<OandaApi>, account_id: u64) -> Self {
        Self { api, account_id }
    }

    pub fn account_id(&self) -> u64 {
        self.account_id
    }

    pub fn api(&self) -> &OandaApi {
        &self.api
    }

    pub fn instruments(&self, query: &InstrumentsQuery) -> Result<PendingResponse<InstrumentsResponse>> {
        self.api.get_instruments(self.account_id, query)
    }

    pub fn info(&self) -> Result<PendingResponse<Account>> {
        self.api.get_account(self.account_id)
    }

    pub fn orders(&self, query: &ListQuery) -> Result<PendingResponse<OrdersResponse>> {
        self.api.get_orders(self.account_id, query)
    }

    pub fn create_order(&self, request: &CreateOrderRequest) -> Result<PendingResponse<OrderResponse>> {
        self.api.create_order(self.account_id, request)
    }

    pub fn order(&self, order_id: u64) -> Result<PendingResponse<Order>> {
        self.api.get_order(self.account_id, order_id)
    }

    pub fn modify_order(
        &self,
        order_id: u64,
        request: &ModifyOrderRequest,
    ) -> Result<PendingResponse<Order>> {
        self.api.modify_order(self.account_id, order_id, request)
    }

    pub fn close_order(&self, order_id: u64) -> Result<PendingResponse<Order>> {
        self.api.close_order(self.account_id, order_id)
    }

    pub fn trades(&self, query: &ListQuery) -> Result<PendingResponse<TradesResponse>> {
        self.api.get_trades(self.account_id, query)
    }

    pub fn trade(&self, trade_id: u64) -> Result<PendingResponse<Trade>> {
        self.api.get_trade(self.account_id, trade_id)
    }

    pub fn modify_trade(
        &self,
        trade_id: u64,
        request: &ModifyTradeRequest,
    ) -> Result<PendingResponse<Trade>> {
        self.api.modify_trade(self.account_id, trade_id, request)
    }

    pub fn close_trade(&self, trade_id: u64) -> Result<PendingResponse<ClosedTrade>> {
        self.api.close_trade(self.account_id, trade_id)
    }

    pub fn positions(&self) -> Result<PendingResponse<PositionsResponse>> {
        self.api.get_positions(self.account_id)
    }

    pub fn position(&self, instrument: &str) -> Result<PendingResponse<Position>> {
        self.api.get_position(self.account_id, instrument)
    }

    pub fn close_position(&self, instrument: &str) -> Result<PendingResponse<ClosedPosition>> {
        self.api.close_position(self.account_id, instrument)
    }

    pub fn transactions(&self, query: &TransactionsQuery) -> Result<PendingResponse<TransactionsResponse>> {
        self.api.get_transaction_history(self.account_id, query)
    }

    pub fn transaction(&self, transaction_id: u64) -> Result<PendingResponse<Transaction>> {
        self.api.get_transaction(self.account_id, transaction_id)
    }
}

/// Collapse a completed call into a JSON value or a printable error string
pub fn error_reply<T: serde::Serialize>(result: Result<T>) -> std::result::Result<Value, String> {
    let value = result.map_err(|err| err.to_string())?;
    serde_json::to_value(value).map_err(|err| err.to_string())
}
