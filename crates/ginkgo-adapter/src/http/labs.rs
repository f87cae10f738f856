/*
[INPUT]:  Instrument and period filters
[OUTPUT]: Raw Forex Labs datasets (calendar, ratios, spreads, COT, order book)
[POS]:    HTTP layer - Forex Labs endpoints
[UPDATE]: When adding Forex Labs datasets
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{OandaApi, PendingResponse, Result};
use crate::types::LabsQuery;

impl OandaApi {
    /// Up to one year of economic calendar entries
    ///
    /// GET labs/v1/calendar
    pub fn get_eco_calendar(&self, query: &LabsQuery) -> Result<PendingResponse<Value>> {
        self.call(Method::GET, "labs/v1/calendar", query)
    }

    /// Up to one year of historical position ratios
    ///
    /// GET labs/v1/historical_position_ratios
    pub fn get_historical_position_ratios(&self, query: &LabsQuery) -> Result<PendingResponse<Value>> {
        self.call(Method::GET, "labs/v1/historical_position_ratios", query)
    }

    /// Up to one year of spread information
    ///
    /// GET labs/v1/spreads
    pub fn get_historical_spreads(&self, query: &LabsQuery) -> Result<PendingResponse<Value>> {
        self.call(Method::GET, "labs/v1/spreads", query)
    }

    /// Up to four years of CFTC Commitments of Traders data
    ///
    /// GET labs/v1/commitments_of_traders
    pub fn get_commitments_of_traders(&self, query: &LabsQuery) -> Result<PendingResponse<Value>> {
        self.call(Method::GET, "labs/v1/commitments_of_traders", query)
    }

    /// Up to one year of OANDA order book snapshots
    ///
    /// GET labs/v1/orderbook_data
    pub fn get_orderbook(&self, query: &LabsQuery) -> Result<PendingResponse<Value>> {
        self.call(Method::GET, "labs/v1/orderbook_data", query)
    }
}
