/*
[INPUT]:  Stream URL, access token, stream parameters and a handler
[OUTPUT]: Decoded stream lines delivered to the handler or a channel
[POS]:    Stream layer - long-poll HTTP streaming loop
[UPDATE]: When adding stream kinds or changing reconnect behavior
*/

use futures_util::StreamExt;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::http::client::{default_headers, normalize_base_url};
use crate::http::{OandaError, Params, Result};
use crate::stream::framing::{DEFAULT_MAX_LINE_BYTES, LineFramer};
use crate::stream::message::{StreamEvent, StreamKind, StreamMessage};
use crate::types::{Environment, StreamQuery};

/// Receives stream traffic.
///
/// Both callbacks run on the stream task, so they should return quickly.
pub trait StreamHandler: Send + Sync + 'static {
    fn on_stream(&self, kind: StreamKind, message: StreamMessage) {
        info!(stream = %kind, message = ?message, "{kind}: stream message");
    }

    fn on_error(&self, kind: StreamKind, error: OandaError) {
        warn!(stream = %kind, error = %error, "{kind}: stream error");
    }
}

impl StreamHandler for mpsc::UnboundedSender<StreamEvent> {
    fn on_stream(&self, kind: StreamKind, message: StreamMessage) {
        // Receiver gone; the owner is expected to stop the stream
        let _ = self.send(StreamEvent::Message(kind, message));
    }

    fn on_error(&self, kind: StreamKind, error: OandaError) {
        let _ = self.send(StreamEvent::Error(kind, error));
    }
}

impl<H: StreamHandler> StreamHandler for Arc<H> {
    fn on_stream(&self, kind: StreamKind, message: StreamMessage) {
        (**self).on_stream(kind, message);
    }

    fn on_error(&self, kind: StreamKind, error: OandaError) {
        (**self).on_error(kind, error);
    }
}

/// Streaming connection configuration
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub connect_timeout: Duration,
    /// Fixed pause before the request is re-issued
    pub reconnect_delay: Duration,
    /// Longest silence tolerated while waiting for headers or body bytes;
    /// the server heartbeats every few seconds
    pub stall_timeout: Duration,
    pub max_line_bytes: usize,
    pub headers: Vec<(String, String)>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            reconnect_delay: Duration::from_secs(1),
            stall_timeout: Duration::from_secs(20),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            headers: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct StreamTask {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// Everything the background loop needs, cloned out of the owner
#[derive(Debug, Clone)]
struct StreamContext {
    http_client: Client,
    url: Url,
    params: Params,
    kind: StreamKind,
    ignore_heartbeat: bool,
    reconnect_delay: Duration,
    stall_timeout: Duration,
    max_line_bytes: usize,
}

/// Long-lived rates or events stream.
///
/// The server keeps the response open and writes one JSON object per line.
/// When the body ends the request is issued again until [`OandaStream::stop`].
#[derive(Debug)]
pub struct OandaStream {
    http_client: Client,
    base_url: Url,
    kind: StreamKind,
    config: StreamConfig,
    task: Mutex<Option<StreamTask>>,
}

impl OandaStream {
    pub fn new(environment: Environment, access_token: Option<&str>, kind: StreamKind) -> Result<Self> {
        Self::with_config(environment, access_token, kind, StreamConfig::default())
    }

    pub fn with_config(
        environment: Environment,
        access_token: Option<&str>,
        kind: StreamKind,
        config: StreamConfig,
    ) -> Result<Self> {
        Self::with_config_and_base_url(config, environment.stream_url()?, access_token, kind)
    }

    pub fn with_config_and_base_url(
        config: StreamConfig,
        base_url: &str,
        access_token: Option<&str>,
        kind: StreamKind,
    ) -> Result<Self> {
        // No total timeout: the response body never completes on a healthy stream
        let http_client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .default_headers(default_headers(access_token, &config.headers)?)
            .build()?;

        Ok(Self {
            http_client,
            base_url: normalize_base_url(base_url)?,
            kind,
            config,
            task: Mutex::new(None),
        })
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Spawn the stream loop; fails with `AlreadyRunning` while connected
    pub fn start<H: StreamHandler>(&self, query: &StreamQuery, handler: H) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| OandaError::Config(format!("stream needs a Tokio runtime: {err}")))?;

        let mut guard = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.as_ref().is_some_and(|task| !task.handle.is_finished()) {
            return Err(OandaError::AlreadyRunning);
        }

        let context = StreamContext {
            http_client: self.http_client.clone(),
            url: self.base_url.join(self.kind.endpoint())?,
            params: Params::from_serialize(query)?,
            kind: self.kind,
            ignore_heartbeat: query.ignore_heartbeat,
            reconnect_delay: self.config.reconnect_delay,
            stall_timeout: self.config.stall_timeout,
            max_line_bytes: self.config.max_line_bytes,
        };
        let shutdown = CancellationToken::new();
        let handle = runtime.spawn(run_stream(context, handler, shutdown.clone()));
        *guard = Some(StreamTask { shutdown, handle });
        info!(stream = %self.kind, base_url = %self.base_url, "stream started");
        Ok(())
    }

    /// Start and deliver everything through a channel instead of callbacks
    pub fn start_channel(&self, query: &StreamQuery) -> Result<mpsc::UnboundedReceiver<StreamEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.start(query, tx)?;
        Ok(rx)
    }

    /// Cancel the loop and wait for it; no-op when stopped
    pub async fn stop(&self) {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        let Some(task) = task else {
            return;
        };

        task.shutdown.cancel();
        if let Err(err) = task.handle.await {
            warn!(stream = %self.kind, error = %err, "stream task terminated abnormally");
        }
        info!(stream = %self.kind, "stream stopped");
    }

    pub fn is_connected(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished() && !task.shutdown.is_cancelled())
    }
}

impl Drop for OandaStream {
    fn drop(&mut self) {
        let task = self.task.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = task.as_ref() {
            task.shutdown.cancel();
        }
    }
}

async fn run_stream<H: StreamHandler>(context: StreamContext, handler: H, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            result = read_stream(&context, &handler) => {
                if let Err(err) = result {
                    warn!(stream = %context.kind, error = %err, "stream request failed");
                    handler.on_error(context.kind, err);
                }
            }
        }

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(context.reconnect_delay) => {}
        }
        debug!(stream = %context.kind, "stream reconnecting");
    }
}

/// One request/response cycle; returns when the body ends
async fn read_stream<H: StreamHandler>(context: &StreamContext, handler: &H) -> Result<()> {
    let request = context
        .http_client
        .get(context.url.clone())
        .query(context.params.as_pairs())
        .send();
    let response = tokio::time::timeout(context.stall_timeout, request)
        .await
        .map_err(|_| stalled(context))??;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await?;
        return Err(match serde_json::from_str::<Value>(&body) {
            Ok(content) => OandaError::api_error(status, &content),
            Err(_) => OandaError::Stream(format!("status {}: {body}", status.as_u16())),
        });
    }
    info!(stream = %context.kind, "stream connected");

    let mut framer = LineFramer::with_max_line(context.max_line_bytes);
    let mut body = response.bytes_stream();
    loop {
        let chunk = match tokio::time::timeout(context.stall_timeout, body.next()).await {
            Ok(Some(chunk)) => chunk?,
            Ok(None) => break,
            Err(_) => return Err(stalled(context)),
        };
        for line in framer.push(&chunk) {
            match line {
                Ok(line) => dispatch(context, handler, &line),
                Err(err) => handler.on_error(context.kind, err),
            }
        }
    }
    if let Some(line) = framer.finish() {
        dispatch(context, handler, &line);
    }

    debug!(stream = %context.kind, "stream body ended");
    Ok(())
}

fn stalled(context: &StreamContext) -> OandaError {
    OandaError::Stream(format!(
        "no data for {} ms",
        context.stall_timeout.as_millis()
    ))
}

fn dispatch<H: StreamHandler>(context: &StreamContext, handler: &H, line: &[u8]) {
    let value = match serde_json::from_slice::<Value>(line) {
        Ok(value) => value,
        Err(err) => {
            let text = String::from_utf8_lossy(line);
            debug!(stream = %context.kind, line = %text, "invalid stream line");
            handler.on_error(
                context.kind,
                OandaError::InvalidResponse(format!("invalid stream line ({err}): {text}")),
            );
            return;
        }
    };

    let message = StreamMessage::from_value(value);
    if context.ignore_heartbeat && message.is_heartbeat() {
        return;
    }
    handler.on_stream(context.kind, message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RATES_BODY: &str = concat!(
        "{\"tick\":{\"instrument\":\"EUR_USD\",\"time\":\"2014-01-30T20:47:08Z\",\"bid\":1.3613,\"ask\":1.3615}}\r\n",
        "{\"heartbeat\":{\"time\":\"2014-01-30T20:47:11Z\"}}\n",
        "\n",
        "not json\n",
        "{\"tick\":{\"instrument\":\"EUR_USD\",\"time\":\"2014-01-30T20:47:12Z\",\"bid\":1.3614,\"ask\":1.3616}}"
    );

    fn stream_for(server: &MockServer, kind: StreamKind) -> OandaStream {
        let config = StreamConfig {
            reconnect_delay: Duration::from_millis(50),
            ..StreamConfig::default()
        };
        OandaStream::with_config_and_base_url(config, &server.uri(), Some("test-token"), kind)
            .expect("stream init")
    }

    /// Plain HTTP server that answers every connection with a chunked 200,
    /// writes `line` once and then keeps the socket open without sending more
    async fn silent_server(line: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let uri = format!("http://{}", listener.local_addr().expect("local addr"));
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut request = [0u8; 4096];
                    let _ = socket.read(&mut request).await;
                    let head = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ntransfer-encoding: chunked\r\n\r\n";
                    let chunk = format!("{:x}\r\n{line}\r\n", line.len());
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(chunk.as_bytes()).await;
                    let _ = socket.flush().await;
                    tokio::time::sleep(Duration::from_secs(60)).await;
                });
            }
        });
        (uri, connections)
    }

    const HEARTBEAT_LINE: &str = "{\"heartbeat\":{\"time\":\"2014-01-30T20:47:11Z\"}}\n";

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<StreamEvent>) -> StreamEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("stream event timed out")
            .expect("stream channel closed")
    }

    #[tokio::test]
    async fn test_rates_stream_skips_heartbeats_and_reports_bad_lines() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/prices"))
            .and(query_param("accountId", "12345"))
            .and(query_param("instruments", "EUR_USD,USD_JPY"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RATES_BODY))
            .mount(&server)
            .await;

        let stream = stream_for(&server, StreamKind::Rates);
        let query = StreamQuery::rates(12345, ["EUR_USD", "USD_JPY"]).ignore_heartbeat(true);
        let mut rx = stream.start_channel(&query).expect("start");
        assert!(stream.is_connected());

        match next_event(&mut rx).await {
            StreamEvent::Message(StreamKind::Rates, StreamMessage::Tick(tick)) => {
                assert_eq!(tick.instrument, "EUR_USD");
            }
            other => panic!("Expected tick, got {other:?}"),
        }
        assert!(matches!(
            next_event(&mut rx).await,
            StreamEvent::Error(StreamKind::Rates, OandaError::InvalidResponse(_))
        ));
        // Unterminated final line is flushed when the body ends
        assert!(matches!(
            next_event(&mut rx).await,
            StreamEvent::Message(StreamKind::Rates, StreamMessage::Tick(_))
        ));
        // Reconnect replays the body
        assert!(matches!(
            next_event(&mut rx).await,
            StreamEvent::Message(StreamKind::Rates, StreamMessage::Tick(_))
        ));

        stream.stop().await;
        assert!(!stream.is_connected());
    }

    #[tokio::test]
    async fn test_heartbeats_delivered_unless_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/events"))
            .and(query_param("accountIds", "1,2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{\"heartbeat\":{\"time\":\"2014-01-30T20:47:11Z\"}}\n"),
            )
            .mount(&server)
            .await;

        let stream = stream_for(&server, StreamKind::Events);
        let mut rx = stream.start_channel(&StreamQuery::events(vec![1, 2])).expect("start");
        match next_event(&mut rx).await {
            StreamEvent::Message(StreamKind::Events, message) => assert!(message.is_heartbeat()),
            other => panic!("Expected heartbeat, got {other:?}"),
        }
        stream.stop().await;
    }

    #[tokio::test]
    async fn test_error_status_reaches_handler() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/prices"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": 4,
                "message": "The access token provided does not allow this request to be made"
            })))
            .mount(&server)
            .await;

        let stream = stream_for(&server, StreamKind::Rates);
        let mut rx = stream.start_channel(&StreamQuery::rates(1, ["EUR_USD"])).expect("start");
        match next_event(&mut rx).await {
            StreamEvent::Error(StreamKind::Rates, OandaError::Api { status, code, .. }) => {
                assert_eq!(status, 401);
                assert_eq!(code, 4);
            }
            other => panic!("Expected api error, got {other:?}"),
        }
        stream.stop().await;
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/prices"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let stream = stream_for(&server, StreamKind::Rates);
        let mut rx = stream.start_channel(&StreamQuery::rates(1, ["EUR_USD"])).expect("start");
        match next_event(&mut rx).await {
            StreamEvent::Error(_, OandaError::Stream(text)) => assert!(text.contains("maintenance")),
            other => panic!("Expected stream error, got {other:?}"),
        }
        stream.stop().await;
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/prices"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;

        let stream = stream_for(&server, StreamKind::Rates);
        stream.stop().await;

        let query = StreamQuery::rates(1, ["EUR_USD"]);
        let _rx = stream.start_channel(&query).expect("start");
        assert!(matches!(stream.start_channel(&query), Err(OandaError::AlreadyRunning)));

        stream.stop().await;
        stream.stop().await;
        assert!(!stream.is_connected());
        let _rx = stream.start_channel(&query).expect("restart");
        stream.stop().await;
    }

    #[tokio::test]
    async fn test_silent_connection_is_reported_and_reopened() {
        let (uri, connections) = silent_server(HEARTBEAT_LINE).await;
        let config = StreamConfig {
            reconnect_delay: Duration::from_millis(20),
            stall_timeout: Duration::from_millis(200),
            ..StreamConfig::default()
        };
        let stream = OandaStream::with_config_and_base_url(config, &uri, None, StreamKind::Rates)
            .expect("stream init");
        let mut rx = stream.start_channel(&StreamQuery::rates(1, ["EUR_USD"])).expect("start");

        match next_event(&mut rx).await {
            StreamEvent::Message(_, message) => assert!(message.is_heartbeat()),
            other => panic!("Expected heartbeat, got {other:?}"),
        }
        match next_event(&mut rx).await {
            StreamEvent::Error(StreamKind::Rates, OandaError::Stream(text)) => {
                assert!(text.contains("no data"), "{text}");
            }
            other => panic!("Expected stall error, got {other:?}"),
        }
        // Second connection delivers the heartbeat again
        assert!(matches!(next_event(&mut rx).await, StreamEvent::Message(..)));
        assert!(connections.load(Ordering::SeqCst) >= 2);

        stream.stop().await;
    }

    #[tokio::test]
    async fn test_stop_while_body_is_open() {
        let (uri, connections) = silent_server(HEARTBEAT_LINE).await;
        let stream = OandaStream::with_config_and_base_url(
            StreamConfig::default(),
            &uri,
            None,
            StreamKind::Rates,
        )
        .expect("stream init");
        let mut rx = stream.start_channel(&StreamQuery::rates(1, ["EUR_USD"])).expect("start");
        assert!(matches!(next_event(&mut rx).await, StreamEvent::Message(..)));
        assert!(stream.is_connected());

        tokio::time::timeout(Duration::from_secs(1), stream.stop())
            .await
            .expect("stop blocked on open body");
        assert!(!stream.is_connected());
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_while_waiting_for_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/prices"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(HEARTBEAT_LINE)
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let stream = stream_for(&server, StreamKind::Rates);
        let _rx = stream.start_channel(&StreamQuery::rates(1, ["EUR_USD"])).expect("start");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(stream.is_connected());

        tokio::time::timeout(Duration::from_secs(1), stream.stop())
            .await
            .expect("stop blocked on pending request");
        assert!(!stream.is_connected());
    }

    #[tokio::test]
    async fn test_over_long_line_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/prices"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "{{\"padding\":\"{}\"}}\n{HEARTBEAT_LINE}",
                "x".repeat(256)
            )))
            .mount(&server)
            .await;

        let config = StreamConfig {
            reconnect_delay: Duration::from_millis(50),
            max_line_bytes: 128,
            ..StreamConfig::default()
        };
        let stream =
            OandaStream::with_config_and_base_url(config, &server.uri(), None, StreamKind::Rates)
                .expect("stream init");
        let mut rx = stream.start_channel(&StreamQuery::rates(1, ["EUR_USD"])).expect("start");
        assert!(matches!(
            next_event(&mut rx).await,
            StreamEvent::Error(_, OandaError::InvalidResponse(_))
        ));
        match next_event(&mut rx).await {
            StreamEvent::Message(_, message) => assert!(message.is_heartbeat()),
            other => panic!("Expected heartbeat, got {other:?}"),
        }
        stream.stop().await;
    }

    #[test]
    fn test_sandbox_has_no_stream() {
        let result = OandaStream::new(Environment::Sandbox, Some("token"), StreamKind::Rates);
        assert!(matches!(result, Err(OandaError::BadEnvironment(_))));
    }
}
