/*
[INPUT]:  HTTP configuration (environment, timeouts, bearer token, extra headers)
[OUTPUT]: Configured reqwest client executing one API call at a time
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing response handling
*/

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::http::{OandaError, Params, Result};
use crate::types::Environment;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Extra headers sent with every request
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            headers: Vec::new(),
        }
    }
}

/// HTTP client for the OANDA REST API
#[derive(Debug, Clone)]
pub struct OandaClient {
    http_client: Client,
    base_url: Url,
}

impl OandaClient {
    /// Create a new client with default configuration
    pub fn new(environment: Environment, access_token: Option<&str>) -> Result<Self> {
        Self::with_config(environment, access_token, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(
        environment: Environment,
        access_token: Option<&str>,
        config: ClientConfig,
    ) -> Result<Self> {
        Self::with_config_and_base_url(config, environment.api_url(), access_token)
    }

    /// Create a client against an arbitrary base URL (mock servers, proxies)
    pub fn with_config_and_base_url(
        config: ClientConfig,
        base_url: &str,
        access_token: Option<&str>,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(default_headers(access_token, &config.headers)?)
            .build()?;

        Ok(Self {
            http_client,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL for an endpoint such as `v1/prices`
    pub fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Build a request; GET carries the params in the query string, every
    /// other method sends them as a form body
    pub(crate) fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: &Params,
    ) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        let builder = self.http_client.request(method.clone(), url);
        Ok(if method == Method::GET {
            builder.query(params.as_pairs())
        } else {
            builder.form(params.as_pairs())
        })
    }

    /// Perform one API call and decode its JSON body
    pub async fn execute(&self, endpoint: &str, method: Method, params: &Params) -> Result<Value> {
        let builder = self.request(method, endpoint, params)?;
        self.send_json(builder).await
    }

    pub(crate) async fn send_json(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = bytes.len(), "api response received");

        let content: Value = serde_json::from_slice(&bytes)?;
        if status.is_client_error() || status.is_server_error() {
            return Err(OandaError::api_error(status, &content));
        }
        Ok(content)
    }
}

pub(crate) fn default_headers(
    access_token: Option<&str>,
    extra: &[(String, String)],
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = access_token.filter(|token| !token.is_empty()) {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|err| OandaError::Config(format!("invalid access token: {err}")))?;
        headers.insert(AUTHORIZATION, value);
    }
    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| OandaError::Config(format!("invalid header name {name}: {err}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| OandaError::Config(format!("invalid header value: {err}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// `Url::join` drops the last path segment unless the base ends with `/`
pub(crate) fn normalize_base_url(base_url: &str) -> Result<Url> {
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{base_url}/"))?)
    }
}
