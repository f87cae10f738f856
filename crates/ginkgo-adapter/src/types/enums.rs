/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::http::OandaError;

const SANDBOX_API_URL: &str = "http://api-sandbox.oanda.com";
const PRACTICE_API_URL: &str = "https://api-fxpractice.oanda.com";
const LIVE_API_URL: &str = "https://api-fxtrade.oanda.com";
const PRACTICE_STREAM_URL: &str = "https://stream-fxpractice.oanda.com";
const LIVE_STREAM_URL: &str = "https://stream-fxtrade.oanda.com";

/// Trading environment selecting the broker hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    Practice,
    Live,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Practice => "practice",
            Environment::Live => "live",
        }
    }

    /// REST API base URL
    pub fn api_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_API_URL,
            Environment::Practice => PRACTICE_API_URL,
            Environment::Live => LIVE_API_URL,
        }
    }

    /// Streaming API base URL; the sandbox has none
    pub fn stream_url(&self) -> Result<&'static str, OandaError> {
        match self {
            Environment::Sandbox => Err(OandaError::BadEnvironment(self.as_str().to_string())),
            Environment::Practice => Ok(PRACTICE_STREAM_URL),
            Environment::Live => Ok(LIVE_STREAM_URL),
        }
    }
}

impl FromStr for Environment {
    type Err = OandaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sandbox" => Ok(Environment::Sandbox),
            "practice" => Ok(Environment::Practice),
            "live" => Ok(Environment::Live),
            other => Err(OandaError::BadEnvironment(other.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    MarketIfTouched,
}

/// Candle width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    S5,
    S10,
    S15,
    S30,
    M1,
    M2,
    M3,
    M4,
    M5,
    M10,
    M15,
    M30,
    H1,
    H2,
    H3,
    H4,
    H6,
    H8,
    H12,
    D,
    W,
    M,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleFormat {
    Midpoint,
    Bidask,
}
