/*
[INPUT]:  Account id and instrument
[OUTPUT]: Net positions and position close results
[POS]:    HTTP layer - position endpoints
[UPDATE]: When adding position endpoints
*/

use reqwest::Method;

use crate::http::params::encode_path_segment;
use crate::http::{OandaApi, Params, PendingResponse, Result};
use crate::types::{ClosedPosition, Position, PositionsResponse};

impl OandaApi {
    /// GET v1/accounts/{account_id}/positions
    pub fn get_positions(&self, account_id: u64) -> Result<PendingResponse<PositionsResponse>> {
        self.call_with(
            Method::GET,
            format!("v1/accounts/{account_id}/positions"),
            Params::new(),
        )
    }

    /// GET v1/accounts/{account_id}/positions/{instrument}
    pub fn get_position(&self, account_id: u64, instrument: &str) -> Result<PendingResponse<Position>> {
        let instrument = encode_path_segment(instrument);
        self.call_with(
            Method::GET,
            format!("v1/accounts/{account_id}/positions/{instrument}"),
            Params::new(),
        )
    }

    /// Close every trade in the instrument
    ///
    /// DELETE v1/accounts/{account_id}/positions/{instrument}
    pub fn close_position(
        &self,
        account_id: u64,
        instrument: &str,
    ) -> Result<PendingResponse<ClosedPosition>> {
        let instrument = encode_path_segment(instrument);
        self.call_with(
            Method::DELETE,
            format!("v1/accounts/{account_id}/positions/{instrument}"),
            Params::new(),
        )
    }
}
