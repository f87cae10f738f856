/*
[INPUT]:  API requests submitted by any number of callers
[OUTPUT]: Responses delivered through per-request wait handles
[POS]:    HTTP layer - single worker that serializes outbound calls
[UPDATE]: When changing worker lifecycle or completion semantics
*/

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::{Future, IntoFuture};
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::http::{OandaClient, OandaError, Params, Result};

/// One queued API call
#[derive(Debug)]
pub struct ApiRequest {
    id: Uuid,
    endpoint: String,
    method: Method,
    params: Params,
    reply: oneshot::Sender<Result<Value>>,
}

impl ApiRequest {
    fn new(endpoint: String, method: Method, params: Params) -> (Self, oneshot::Receiver<Result<Value>>) {
        let (reply, rx) = oneshot::channel();
        let request = Self {
            id: Uuid::new_v4(),
            endpoint,
            method,
            params,
            reply,
        };
        (request, rx)
    }
}

/// Wait handle for a queued request.
///
/// Await it right away for a synchronous-style call, or keep it and complete
/// it later. Dropping it does not cancel the request.
#[must_use = "the response is only observable through the handle"]
#[derive(Debug)]
pub struct PendingResponse<T> {
    id: Uuid,
    rx: oneshot::Receiver<Result<Value>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> PendingResponse<T> {
    fn new(id: Uuid, rx: oneshot::Receiver<Result<Value>>) -> Self {
        Self {
            id,
            rx,
            _marker: PhantomData,
        }
    }

    /// Identifier used in the worker's log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait until the worker has processed the request
    pub async fn wait_for_complete(self) -> Result<T> {
        let value = self.rx.await.map_err(|_| OandaError::QueueClosed)??;
        decode(value)
    }

    /// Block the current thread until the request completes.
    ///
    /// Must not be called from inside an async context.
    pub fn blocking_wait(self) -> Result<T> {
        let value = self.rx.blocking_recv().map_err(|_| OandaError::QueueClosed)??;
        decode(value)
    }

    /// Take the response if it is ready without waiting
    pub fn try_take(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result.and_then(decode)),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(OandaError::QueueClosed)),
        }
    }
}

impl<T> IntoFuture for PendingResponse<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = Result<T>;
    type IntoFuture = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait_for_complete())
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

struct Worker {
    tx: mpsc::UnboundedSender<ApiRequest>,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// Serializes API calls through one background worker
pub struct RequestQueue {
    client: Arc<OandaClient>,
    worker: Mutex<Option<Worker>>,
}

impl std::fmt::Debug for RequestQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestQueue")
            .field("base_url", &self.client.base_url().as_str())
            .field("running", &self.is_running())
            .finish()
    }
}

impl RequestQueue {
    pub fn new(client: OandaClient) -> Self {
        Self {
            client: Arc::new(client),
            worker: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &OandaClient {
        &self.client
    }

    /// Start the worker; needs a Tokio runtime
    pub fn init(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| OandaError::Config(format!("request queue needs a Tokio runtime: {err}")))?;

        let mut guard = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.as_ref().is_some_and(|worker| !worker.handle.is_finished()) {
            return Err(OandaError::AlreadyRunning);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let handle = runtime.spawn(run_worker(self.client.clone(), rx, shutdown.clone()));
        *guard = Some(Worker { tx, shutdown, handle });
        info!(base_url = %self.client.base_url(), "request queue started");
        Ok(())
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// A request already on the wire completes; queued ones fail with
    /// [`OandaError::QueueClosed`].
    pub async fn deinit(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(worker) = worker else {
            return;
        };

        worker.shutdown.cancel();
        drop(worker.tx);
        if let Err(err) = worker.handle.await {
            warn!(error = %err, "request worker terminated abnormally");
        }
        info!("request queue stopped");
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished() && !worker.shutdown.is_cancelled())
    }

    /// Queue a call and return its wait handle
    pub fn submit<T: DeserializeOwned>(
        &self,
        endpoint: impl Into<String>,
        method: Method,
        params: Params,
    ) -> Result<PendingResponse<T>> {
        let tx = {
            let guard = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
            match guard.as_ref() {
                Some(worker) if !worker.shutdown.is_cancelled() => worker.tx.clone(),
                _ => return Err(OandaError::NotRunning),
            }
        };

        let (request, rx) = ApiRequest::new(endpoint.into(), method, params);
        let id = request.id;
        tx.send(request).map_err(|_| OandaError::NotRunning)?;
        Ok(PendingResponse::new(id, rx))
    }
}

async fn run_worker(
    client: Arc<OandaClient>,
    mut rx: mpsc::UnboundedReceiver<ApiRequest>,
    shutdown: CancellationToken,
) {
    loop {
        let request = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = rx.recv() => match next {
                Some(request) => request,
                None => break,
            },
        };

        debug!(
            request_id = %request.id,
            method = %request.method,
            endpoint = %request.endpoint,
            "processing api request"
        );
        let result = client
            .execute(&request.endpoint, request.method.clone(), &request.params)
            .await;
        if let Err(err) = &result {
            warn!(
                request_id = %request.id,
                method = %request.method,
                endpoint = %request.endpoint,
                error = %err,
                "api request failed"
            );
        }
        // Waiter may have dropped its handle
        let _ = request.reply.send(result);
    }

    rx.close();
    let mut dropped = 0usize;
    while let Ok(request) = rx.try_recv() {
        let _ = request.reply.send(Err(OandaError::QueueClosed));
        dropped += 1;
    }
    if dropped > 0 {
        warn!(dropped, "request queue stopped with pending requests");
    }
}
