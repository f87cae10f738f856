/*
[INPUT]:  Stream configuration, parameters and handlers
[OUTPUT]: Rates and events streams delivered line by line
[POS]:    Stream layer - long-lived HTTP streams
[UPDATE]: When adding stream kinds or changing connection logic
*/

pub mod client;
pub mod framing;
pub mod message;

pub use client::{OandaStream, StreamConfig, StreamHandler};
pub use framing::LineFramer;
pub use message::{Heartbeat, StreamEvent, StreamKind, StreamMessage, Tick};
