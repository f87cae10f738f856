/*
[INPUT]:  Environment, access token, client configuration
[OUTPUT]: OandaApi - queued REST wrapper shared by all endpoint groups
[POS]:    HTTP layer - REST entry point (endpoint methods live in sibling files)
[UPDATE]: When changing the REST wrapper lifecycle or generic request path
*/

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::{ClientConfig, OandaClient, Params, PendingResponse, RequestQueue, Result};
use crate::types::Environment;

/// Queued wrapper around the whole v1 REST API.
///
/// Every endpoint method returns a [`PendingResponse`]; await it to wait for
/// the result, or keep it and complete it later. Methods fail with
/// [`crate::OandaError::NotRunning`] until [`OandaApi::init`] is called.
#[derive(Debug)]
pub struct OandaApi {
    queue: RequestQueue,
}

impl OandaApi {
    pub fn new(environment: Environment, access_token: Option<&str>) -> Result<Self> {
        Self::with_config(environment, access_token, ClientConfig::default())
    }

    pub fn with_config(
        environment: Environment,
        access_token: Option<&str>,
        config: ClientConfig,
    ) -> Result<Self> {
        let client = OandaClient::with_config(environment, access_token, config)?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: OandaClient) -> Self {
        Self {
            queue: RequestQueue::new(client),
        }
    }

    /// Start the request worker
    pub fn init(&self) -> Result<()> {
        self.queue.init()
    }

    /// Stop the request worker and wait for it
    pub async fn deinit(&self) {
        self.queue.deinit().await;
    }

    pub fn is_running(&self) -> bool {
        self.queue.is_running()
    }

    pub fn client(&self) -> &OandaClient {
        self.queue.client()
    }

    /// Queue an arbitrary call, for endpoints without a typed wrapper
    pub fn request(
        &self,
        endpoint: impl Into<String>,
        method: Method,
        params: Params,
    ) -> Result<PendingResponse<Value>> {
        self.queue.submit(endpoint, method, params)
    }

    pub(crate) fn call<T, Q>(
        &self,
        method: Method,
        endpoint: impl Into<String>,
        query: &Q,
    ) -> Result<PendingResponse<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let params = Params::from_serialize(query)?;
        self.queue.submit(endpoint, method, params)
    }

    pub(crate) fn call_with<T>(
        &self,
        method: Method,
        endpoint: impl Into<String>,
        params: Params,
    ) -> Result<PendingResponse<T>>
    where
        T: DeserializeOwned,
    {
        self.queue.submit(endpoint, method, params)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::started_api;
    use super::*;
    use crate::http::OandaError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_calls_fail_before_init() {
        let api = OandaApi::new(Environment::Practice, Some("token")).expect("api");
        assert!(!api.is_running());
        let result = api.request("v1/accounts", Method::GET, Params::new());
        assert!(matches!(result, Err(OandaError::NotRunning)));
    }

    #[tokio::test]
    async fn test_raw_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/accounts"))
            .and(query_param("username", "trader"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "accounts": [{ "accountId": 1 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = started_api(&server);
        let body = api
            .request("v1/accounts", Method::GET, Params::new().with("username", "trader"))
            .expect("submit")
            .await
            .expect("response");
        assert_eq!(body["accounts"][0]["accountId"], 1);
        api.deinit().await;
        assert!(!api.is_running());
    }
}
