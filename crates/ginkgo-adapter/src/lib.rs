/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public OANDA adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod http;
pub mod stream;
pub mod types;

// Re-export commonly used types from http
pub use http::{
    AccountSession,
    ClientConfig,
    OandaApi,
    OandaClient,
    OandaError,
    Params,
    PendingResponse,
    RequestQueue,
    Result,
    error_reply,
};

// Re-export all types
pub use types::*;

// Re-export commonly used types from stream
pub use stream::{
    OandaStream,
    StreamConfig,
    StreamEvent,
    StreamHandler,
    StreamKind,
    StreamMessage,
};
