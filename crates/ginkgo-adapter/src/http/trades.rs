/*
[INPUT]:  Account id, trade id and trade adjustments
[OUTPUT]: Open trades and trade close results
[POS]:    HTTP layer - trade endpoints
[UPDATE]: When adding trade endpoints or changing trade flow
*/

use reqwest::Method;

use crate::http::{OandaApi, Params, PendingResponse, Result};
use crate::types::{ClosedTrade, ListQuery, ModifyTradeRequest, Trade, TradesResponse};

impl OandaApi {
    /// GET v1/accounts/{account_id}/trades
    pub fn get_trades(&self, account_id: u64, query: &ListQuery) -> Result<PendingResponse<TradesResponse>> {
        self.call(Method::GET, format!("v1/accounts/{account_id}/trades"), query)
    }

    /// GET v1/accounts/{account_id}/trades/{trade_id}
    pub fn get_trade(&self, account_id: u64, trade_id: u64) -> Result<PendingResponse<Trade>> {
        self.call_with(
            Method::GET,
            format!("v1/accounts/{account_id}/trades/{trade_id}"),
            Params::new(),
        )
    }

    /// Adjust stop loss, take profit or trailing stop of an open trade
    ///
    /// PATCH v1/accounts/{account_id}/trades/{trade_id}
    pub fn modify_trade(
        &self,
        account_id: u64,
        trade_id: u64,
        request: &ModifyTradeRequest,
    ) -> Result<PendingResponse<Trade>> {
        self.call(
            Method::PATCH,
            format!("v1/accounts/{account_id}/trades/{trade_id}"),
            request,
        )
    }

    /// DELETE v1/accounts/{account_id}/trades/{trade_id}
    pub fn close_trade(&self, account_id: u64, trade_id: u64) -> Result<PendingResponse<ClosedTrade>> {
        self.call_with(
            Method::DELETE,
            format!("v1/accounts/{account_id}/trades/{trade_id}"),
            Params::new(),
        )
    }
}
