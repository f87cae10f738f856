/*
[INPUT]:  Mock REST and streaming endpoints
[OUTPUT]: End-to-end trader lifecycle verification
[POS]:    Integration test layer - startup, streaming and clean exit
[UPDATE]: When changing the trader startup or shutdown flow
*/

use std::time::Duration;

use ginkgo_adapter::{ClientConfig, OandaApi, OandaClient, OandaStream, StreamConfig, StreamKind};
use ginkgo_runner::{GinkgoConfig, Trader};
use tokio::time::{sleep, timeout};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONFIG: &str = r#"
environment: practice
access_token: test-token
account_id: 1205962
instruments: [AUD_CAD]
stream_events: true
"#;

fn stream_for(server: &MockServer, kind: StreamKind) -> OandaStream {
    let config = StreamConfig {
        reconnect_delay: Duration::from_millis(20),
        ..StreamConfig::default()
    };
    OandaStream::with_config_and_base_url(config, &server.uri(), Some("test-token"), kind).unwrap()
}

async fn mount_mocks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accounts": [
                { "accountId": 1205962, "accountName": "Primary", "accountCurrency": "USD", "marginRate": 0.05 }
            ]
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/prices"))
        .and(query_param("accountId", "1205962"))
        .and(query_param("instruments", "AUD_CAD"))
        .respond_with(ResponseTemplate::new(200).set_body_string(concat!(
            "{\"heartbeat\":{\"time\":\"2014-01-30T20:47:11Z\"}}\n",
            "{\"tick\":{\"instrument\":\"AUD_CAD\",\"time\":\"2014-01-30T20:47:08Z\",\"bid\":0.98114,\"ask\":0.98139}}\n"
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/events"))
        .and(query_param("accountIds", "1205962"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "{\"transaction\":{\"id\":176403879,\"accountId\":1205962,\"time\":\"2014-04-07T18:31:05Z\",\"type\":\"DAILY_INTEREST\"}}\n",
        ))
        .mount(server)
        .await;
}

/// Trader lists accounts, feeds both streams into the advisor and exits cleanly
#[tokio::test]
async fn test_trader_lifecycle() {
    let server = MockServer::start().await;
    mount_mocks(&server).await;

    let config = assert_ok!(GinkgoConfig::parse_yaml(CONFIG));
    let client = assert_ok!(OandaClient::with_config_and_base_url(
        ClientConfig::default(),
        &server.uri(),
        Some("test-token"),
    ));
    let trader = assert_ok!(
        Trader::start_with(
            &config,
            OandaApi::with_client(client),
            stream_for(&server, StreamKind::Rates),
            Some(stream_for(&server, StreamKind::Events)),
        )
        .await
    );

    let advisor = trader.advisor().clone();
    let reached = timeout(Duration::from_secs(5), async {
        while advisor.last_tick("AUD_CAD").is_none() || advisor.transaction_count() == 0 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(reached.is_ok(), "advisor did not receive stream data");

    assert_eq!(trader.session().account_id(), 1205962);
    assert!(trader.session().api().is_running());

    assert_ok!(timeout(Duration::from_secs(5), trader.shutdown()).await);
    assert_eq!(advisor.error_count(), 0);
}

/// A failed account listing is logged and startup continues
#[tokio::test]
async fn test_trader_survives_account_listing_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "code": 4,
            "message": "The access token provided does not allow this request to be made"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let mut config = assert_ok!(GinkgoConfig::parse_yaml(CONFIG));
    config.stream_events = false;
    let client = assert_ok!(OandaClient::with_config_and_base_url(
        ClientConfig::default(),
        &server.uri(),
        Some("test-token"),
    ));
    let trader = assert_ok!(
        Trader::start_with(
            &config,
            OandaApi::with_client(client),
            stream_for(&server, StreamKind::Rates),
            None,
        )
        .await
    );
    trader.shutdown().await;
}
