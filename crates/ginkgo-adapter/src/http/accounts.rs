/*
[INPUT]:  Account ids and account filters
[OUTPUT]: Account lists, account details, sandbox account creation
[POS]:    HTTP layer - account endpoints
[UPDATE]: When adding account endpoints or changing query parameters
*/

use reqwest::Method;

use crate::http::{OandaApi, Params, PendingResponse, Result};
use crate::types::{Account, AccountsQuery, AccountsResponse, CreateAccountQuery, CreatedAccount};

impl OandaApi {
    /// Create an account; only the sandbox accepts this
    ///
    /// POST v1/accounts
    pub fn create_account(&self, query: &CreateAccountQuery) -> Result<PendingResponse<CreatedAccount>> {
        self.call(Method::POST, "v1/accounts", query)
    }

    /// Accounts owned by the token's user
    ///
    /// GET v1/accounts
    pub fn get_accounts(&self, query: &AccountsQuery) -> Result<PendingResponse<AccountsResponse>> {
        self.call(Method::GET, "v1/accounts", query)
    }

    /// GET v1/accounts/{account_id}
    pub fn get_account(&self, account_id: u64) -> Result<PendingResponse<Account>> {
        self.call_with(Method::GET, format!("v1/accounts/{account_id}"), Params::new())
    }
}
