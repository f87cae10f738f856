/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod account;
pub mod api;
pub mod client;
pub mod error;
pub mod params;
pub mod queue;

mod accounts;
mod labs;
mod orders;
mod positions;
mod rates;
mod trades;
mod transactions;

pub use error::{OandaError, Result};
pub use params::Params;
pub use queue::{ApiRequest, PendingResponse, RequestQueue};

pub use account::{AccountSession, error_reply};
pub use api::OandaApi;
pub use client::{ClientConfig, OandaClient};
