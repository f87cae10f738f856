/*
[INPUT]:  Account id, order id and order parameters
[OUTPUT]: Pending orders and order fill results
[POS]:    HTTP layer - order endpoints
[UPDATE]: When adding order endpoints or changing order flow
*/

use reqwest::Method;

use crate::http::{OandaApi, Params, PendingResponse, Result};
use crate::types::{CreateOrderRequest, ListQuery, ModifyOrderRequest, Order, OrderResponse, OrdersResponse};

impl OandaApi {
    /// Pending orders of an account. Take-profit and stop-loss orders live on
    /// the open trade and are not listed here.
    ///
    /// GET v1/accounts/{account_id}/orders
    pub fn get_orders(&self, account_id: u64, query: &ListQuery) -> Result<PendingResponse<OrdersResponse>> {
        self.call(Method::GET, format!("v1/accounts/{account_id}/orders"), query)
    }

    /// POST v1/accounts/{account_id}/orders
    pub fn create_order(
        &self,
        account_id: u64,
        request: &CreateOrderRequest,
    ) -> Result<PendingResponse<OrderResponse>> {
        self.call(Method::POST, format!("v1/accounts/{account_id}/orders"), request)
    }

    /// GET v1/accounts/{account_id}/orders/{order_id}
    pub fn get_order(&self, account_id: u64, order_id: u64) -> Result<PendingResponse<Order>> {
        self.call_with(
            Method::GET,
            format!("v1/accounts/{account_id}/orders/{order_id}"),
            Params::new(),
        )
    }

    /// PATCH v1/accounts/{account_id}/orders/{order_id}
    pub fn modify_order(
        &self,
        account_id: u64,
        order_id: u64,
        request: &ModifyOrderRequest,
    ) -> Result<PendingResponse<Order>> {
        self.call(
            Method::PATCH,
            format!("v1/accounts/{account_id}/orders/{order_id}"),
            request,
        )
    }

    /// Cancel a pending order
    ///
    /// DELETE v1/accounts/{account_id}/orders/{order_id}
    pub fn close_order(&self, account_id: u64, order_id: u64) -> Result<PendingResponse<Order>> {
        self.call_with(
            Method::DELETE,
            format!("v1/accounts/{account_id}/orders/{order_id}"),
            Params::new(),
        )
    }
}
