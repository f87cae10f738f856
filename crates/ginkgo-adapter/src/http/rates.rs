/*
[INPUT]:  Account id, instruments and candle filters
[OUTPUT]: Instrument lists, live quotes, historical candles
[POS]:    HTTP layer - rates endpoints
[UPDATE]: When adding rate endpoints or changing query parameters
*/

use reqwest::Method;

use crate::http::{OandaApi, Params, PendingResponse, Result};
use crate::types::{Candles, CandlesQuery, InstrumentsQuery, InstrumentsResponse, PricesQuery, PricesResponse};

impl OandaApi {
    /// List instruments tradeable by an account
    ///
    /// GET v1/instruments?accountId={account_id}
    pub fn get_instruments(
        &self,
        account_id: u64,
        query: &InstrumentsQuery,
    ) -> Result<PendingResponse<InstrumentsResponse>> {
        let params = Params::from_serialize(query)?.with("accountId", account_id.to_string());
        self.call_with(Method::GET, "v1/instruments", params)
    }

    /// Current quotes for the given instruments
    ///
    /// GET v1/prices?instruments={instruments}
    pub fn get_prices(&self, query: &PricesQuery) -> Result<PendingResponse<PricesResponse>> {
        self.call(Method::GET, "v1/prices", query)
    }

    /// Historical candles for one instrument
    ///
    /// GET v1/candles?instrument={instrument}
    pub fn get_history(&self, query: &CandlesQuery) -> Result<PendingResponse<Candles>> {
        self.call(Method::GET, "v1/candles", query)
    }
}
