/*
[INPUT]:  Account id, transaction id and history filters
[OUTPUT]: Transaction history records
[POS]:    HTTP layer - transaction history endpoints
[UPDATE]: When adding history endpoints or filters
*/

use reqwest::Method;

use crate::http::{OandaApi, Params, PendingResponse, Result};
use crate::types::{Transaction, TransactionsQuery, TransactionsResponse};

impl OandaApi {
    /// GET v1/accounts/{account_id}/transactions
    pub fn get_transaction_history(
        &self,
        account_id: u64,
        query: &TransactionsQuery,
    ) -> Result<PendingResponse<TransactionsResponse>> {
        self.call(Method::GET, format!("v1/accounts/{account_id}/transactions"), query)
    }

    /// GET v1/accounts/{account_id}/transactions/{transaction_id}
    pub fn get_transaction(
        &self,
        account_id: u64,
        transaction_id: u64,
    ) -> Result<PendingResponse<Transaction>> {
        self.call_with(
            Method::GET,
            format!("v1/accounts/{account_id}/transactions/{transaction_id}"),
            Params::new(),
        )
    }
}
