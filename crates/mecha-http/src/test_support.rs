//! In-process fakes for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use mecha_core::error::TransportError;
use mecha_core::{LoginRedirect, PreparedRequest, RawResponse, Transport};

type Handler =
    Box<dyn Fn(&PreparedRequest) -> Result<RawResponse, TransportError> + Send + Sync>;
type Delay = Box<dyn Fn(&PreparedRequest) -> Duration + Send + Sync>;

/// A transport answering from a closure and recording what it was sent.
pub(crate) struct ScriptedTransport {
    handler: Handler,
    delay: Option<Delay>,
    requests: Mutex<Vec<PreparedRequest>>,
    completed: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(
        handler: impl Fn(&PreparedRequest) -> Result<RawResponse, TransportError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            delay: None,
            requests: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
        }
    }

    /// Sleep before answering. Combine with a paused clock.
    pub fn with_delay(
        mut self,
        delay: impl Fn(&PreparedRequest) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests sent to a URL path.
    pub fn requests_to(&self, path: &str) -> Vec<PreparedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.path() == path)
            .collect()
    }

    /// Requests whose answer was produced, as opposed to cancelled mid-flight.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(&request)).await;
        }
        let response = (self.handler)(&request);
        self.completed.fetch_add(1, Ordering::SeqCst);
        response
    }
}

/// Records every redirect instead of performing it.
#[derive(Debug, Default)]
pub(crate) struct RecordingRedirect {
    calls: Mutex<Vec<String>>,
}

impl RecordingRedirect {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl LoginRedirect for RecordingRedirect {
    fn redirect_to_login(&self, entry_point: &str) {
        self.calls.lock().unwrap().push(entry_point.to_string());
    }
}
