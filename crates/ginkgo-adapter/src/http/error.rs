/*
[INPUT]:  Error sources (HTTP, broker API, serialization, queue lifecycle, streaming)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Main error type for the OANDA adapter
#[derive(Error, Debug)]
pub enum OandaError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Broker returned an error response
    #[error("Oanda API returned error code {code} - {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
        more_info: Option<String>,
    },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Unknown trading environment
    #[error("Environment '{0}' does not exist")]
    BadEnvironment(String),

    /// Request submitted while the worker is stopped
    #[error("Request queue is not running")]
    NotRunning,

    /// Worker or stream started twice
    #[error("Already running")]
    AlreadyRunning,

    /// Worker stopped before the request completed
    #[error("Request queue closed before the request completed")]
    QueueClosed,

    /// Request parameters could not be encoded
    #[error("Invalid request parameters: {0}")]
    InvalidParams(String),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Streaming connection failure
    #[error("Stream error: {0}")]
    Stream(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error body returned by the v1 REST API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub more_info: Option<String>,
}

impl OandaError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            OandaError::Http(err) => err.is_timeout() || err.is_connect(),
            OandaError::Api { status, .. } => *status >= 500,
            OandaError::Stream(_) | OandaError::InvalidResponse(_) => true,
            _ => false,
        }
    }

    /// Check if the broker rejected the request
    pub fn is_api_error(&self) -> bool {
        matches!(self, OandaError::Api { .. })
    }

    /// Create an API error from a status code and the decoded response body
    pub fn api_error(status: StatusCode, body: &serde_json::Value) -> Self {
        match serde_json::from_value::<ApiErrorBody>(body.clone()) {
            Ok(parsed) if !parsed.message.is_empty() => OandaError::Api {
                status: status.as_u16(),
                code: parsed.code,
                message: parsed.message,
                more_info: parsed.more_info,
            },
            _ => OandaError::Api {
                status: status.as_u16(),
                code: i64::from(status.as_u16()),
                message: body.to_string(),
                more_info: None,
            },
        }
    }
}

/// Result type alias for OANDA operations
pub type Result<T> = std::result::Result<T, OandaError>;
