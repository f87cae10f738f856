/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for ginkgo-adapter tests

#![allow(dead_code)]

use ginkgo_adapter::{ClientConfig, OandaApi, OandaClient};
use wiremock::MockServer;

pub const TEST_ACCOUNT_ID: u64 = 8954947;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Access token accepted by every mock
pub fn mock_access_token() -> String {
    "0123456789abcdef-fedcba9876543210".to_string()
}

/// Started API pointed at the mock server
pub fn started_api(server: &MockServer) -> OandaApi {
    let token = mock_access_token();
    let client = OandaClient::with_config_and_base_url(ClientConfig::default(), &server.uri(), Some(&token))
        .expect("client init");
    let api = OandaApi::with_client(client);
    api.init().expect("api init");
    api
}
