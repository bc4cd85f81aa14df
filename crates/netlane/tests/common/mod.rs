//! Scripted transport and helpers shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream;
use netlane::effects::BoxStream;
use netlane::{
    EventSink, Method, NetworkEvent, OutboundRequest, RequestId, RequestManager, RequestSpec,
    Transport, TransportResponse,
};
use url::Url;

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ScriptError(pub String);

/// What the transport does for one URL path.
#[derive(Debug, Clone)]
pub enum Script {
    Respond(Reply),
    /// Never produces a response head.
    Hang,
    /// Fails before a response head.
    Fail(String),
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub content_headers: Vec<(String, String)>,
    pub frames: Vec<Bytes>,
    pub content_length: Option<u64>,
    /// Delay before each body frame.
    pub frame_delay: Duration,
    /// Fail the body stream after this many frames.
    pub fail_after: Option<usize>,
    /// Stop producing frames after this many, without ending the stream.
    pub stall_after: Option<usize>,
    /// Redirect target reported as the final URL.
    pub final_path: Option<String>,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            content_headers: Vec::new(),
            frames: vec![Bytes::from(body.to_string())],
            content_length: Some(body.len() as u64),
            frame_delay: Duration::ZERO,
            fail_after: None,
            stall_after: None,
            final_path: None,
        }
    }

    pub fn bytes(body: &[u8]) -> Self {
        Self {
            frames: vec![Bytes::copy_from_slice(body)],
            content_length: Some(body.len() as u64),
            ..Self::ok("")
        }
    }

    pub fn frames(frames: &[&str]) -> Self {
        let frames: Vec<Bytes> = frames.iter().map(|f| Bytes::from(f.to_string())).collect();
        let len = frames.iter().map(Bytes::len).sum::<usize>() as u64;
        Self {
            frames,
            content_length: Some(len),
            ..Self::ok("")
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn content_header(mut self, name: &str, value: &str) -> Self {
        self.content_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn unknown_length(mut self) -> Self {
        self.content_length = None;
        self
    }

    pub fn frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }

    pub fn fail_after(mut self, frames: usize) -> Self {
        self.fail_after = Some(frames);
        self
    }

    pub fn stall_after(mut self, frames: usize) -> Self {
        self.stall_after = Some(frames);
        self
    }

    pub fn redirected_to(mut self, path: &str) -> Self {
        self.final_path = Some(path.to_string());
        self
    }

    fn into_response(self, url: &Url) -> TransportResponse<ScriptError> {
        let mut final_url = url.clone();
        if let Some(path) = &self.final_path {
            final_url.set_path(path);
        }

        let delay = self.frame_delay;
        let mut items: Vec<Result<Bytes, ScriptError>> = self.frames.into_iter().map(Ok).collect();
        if let Some(n) = self.fail_after {
            items.truncate(n);
            items.push(Err(ScriptError("connection reset by peer".to_string())));
        }
        let stall = self.stall_after;
        if let Some(n) = stall {
            items.truncate(n);
        }

        let frames = stream::iter(items).then(move |item| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            item
        });
        let body: BoxStream<'static, Result<Bytes, ScriptError>> = match stall {
            Some(_) => Box::pin(frames.chain(stream::pending())),
            None => Box::pin(frames),
        };

        TransportResponse {
            status: self.status,
            url: final_url,
            headers: self.headers,
            content_headers: self.content_headers,
            content_length: self.content_length,
            body,
        }
    }
}

/// In-memory transport answering by URL path.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, Script>>,
    sent: Mutex<Vec<OutboundRequest>>,
    calls: AtomicUsize,
    head_delay: Mutex<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, path: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .insert(path.to_string(), script);
    }

    pub fn respond(&self, path: &str, reply: Reply) {
        self.script(path, Script::Respond(reply));
    }

    /// Delay before every response head.
    pub fn head_delay(&self, delay: Duration) {
        *self.head_delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    type Error = ScriptError;

    async fn send(
        &self,
        request: OutboundRequest,
    ) -> Result<TransportResponse<ScriptError>, ScriptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(request.clone());

        let delay = *self.head_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(request.url.path())
            .cloned()
            .unwrap_or_else(|| Script::Fail(format!("no script for {}", request.url.path())));

        match script {
            Script::Respond(reply) => Ok(reply.into_response(&request.url)),
            Script::Hang => std::future::pending().await,
            Script::Fail(message) => Err(ScriptError(message)),
        }
    }
}

/// Lets tests share one scripted transport with the manager.
#[derive(Debug, Clone)]
pub struct SharedTransport(pub Arc<ScriptedTransport>);

impl Transport for SharedTransport {
    type Error = ScriptError;

    async fn send(
        &self,
        request: OutboundRequest,
    ) -> Result<TransportResponse<ScriptError>, ScriptError> {
        self.0.send(request).await
    }
}

/// Sink that records every event.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<NetworkEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NetworkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, id: RequestId) -> Vec<NetworkEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.id() == id)
            .collect()
    }

    pub fn terminals_for(&self, id: RequestId) -> Vec<NetworkEvent> {
        self.events_for(id)
            .into_iter()
            .filter(NetworkEvent::is_terminal)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: NetworkEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn url(path: &str) -> Url {
    Url::parse("https://api.test").unwrap().join(path).unwrap()
}

pub fn get(id: i64, path: &str) -> RequestSpec {
    RequestSpec::new(id, Method::parse("GET").unwrap(), url(path))
}

pub fn post(id: i64, path: &str) -> RequestSpec {
    RequestSpec::new(id, Method::parse("POST").unwrap(), url(path))
}

/// Wait until no request is in flight.
pub async fn wait_idle<T, S>(manager: &RequestManager<T, S>)
where
    T: Transport + 'static,
    S: EventSink + 'static,
{
    tokio::time::timeout(Duration::from_secs(60), async {
        while manager.in_flight() > 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("requests did not settle");
}
