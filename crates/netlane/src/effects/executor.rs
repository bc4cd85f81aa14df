//! End-to-end execution of a single request.
//!
//! The executor owns the outbound message, the response stream and the
//! progress counter for the lifetime of one request. All three are plain
//! owned values inside the request future, so every exit path (success,
//! failure, timeout, cancellation, or the future being dropped) releases
//! them.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::core::{
    BodySource, PreparedBody, apply_request_headers, build_body, decode_text, encode_content,
    find_header, merge_response_headers, set_header,
};
use crate::data::{
    ManagerConfig, NetworkEvent, RequestFailure, RequestId, RequestSpec, RequestState,
    ResponseHeaders, ResponseMode, Terminal,
};
use crate::effects::http::{BoxStream, OutboundRequest, Transport};
use crate::effects::reader::IncrementalReader;
use crate::effects::sink::EventSink;
use crate::error::{Error, Result};

/// Manager-wide "host is tearing down" flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// How a request ended, as seen by the executor.
///
/// Exactly one is produced per executed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Terminal success event emitted.
    Succeeded,
    /// Terminal error event emitted.
    Failed(RequestFailure),
    /// Aborted by the caller; nothing emitted.
    Cancelled,
    /// Failed after shutdown; nothing emitted.
    Suppressed(RequestFailure),
}

pub struct RequestExecutor<T, S> {
    transport: Arc<T>,
    sink: Arc<S>,
    config: Arc<ManagerConfig>,
    shutdown: ShutdownSignal,
}

impl<T, S> Clone for RequestExecutor<T, S> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            sink: Arc::clone(&self.sink),
            config: Arc::clone(&self.config),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<T, S> RequestExecutor<T, S>
where
    T: Transport,
    S: EventSink,
{
    pub fn new(
        transport: Arc<T>,
        sink: Arc<S>,
        config: Arc<ManagerConfig>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            transport,
            sink,
            config,
            shutdown,
        }
    }

    /// Run `spec` to completion under `cancel`.
    ///
    /// Emits zero or more progress events and at most one terminal event,
    /// and returns the outcome that decided which.
    pub async fn execute(&self, spec: RequestSpec, cancel: CancellationToken) -> RequestOutcome {
        let id = spec.id;
        let state = RequestState::Pending;
        if cancel.is_cancelled() {
            return self.finish(id, state, Err(Error::Cancelled));
        }

        let prepared = match build_body(&spec.body, &spec.headers) {
            Ok(prepared) => prepared,
            Err(e) => return self.finish(id, state, Err(e)),
        };
        let mut state = state.advance(RequestState::Sending);

        let deadline = spec.timeout.or_else(|| self.config.default_timeout());
        // An abort always wins. Completion is polled before the deadline so
        // a read that finished by the time the deadline fires reports success.
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = self.run(&spec, prepared, &mut state) => result,
            () = expire(deadline) => Err(Error::Timeout),
        };

        self.finish(id, state, result)
    }

    async fn run(
        &self,
        spec: &RequestSpec,
        prepared: PreparedBody,
        state: &mut RequestState,
    ) -> Result<()> {
        let request = self.outbound(spec, prepared).await?;
        let response = self
            .transport
            .send(request)
            .await
            .map_err(Error::transport)?;

        let mut headers = ResponseHeaders::new();
        merge_response_headers(&mut headers, &response.headers);
        merge_response_headers(&mut headers, &response.content_headers);
        tracing::debug!(status = response.status, "response received");
        self.sink.emit(NetworkEvent::ResponseReceived {
            id: spec.id,
            status: response.status,
            headers,
            url: response.url.path().to_string(),
        });

        match spec.mode {
            ResponseMode::IncrementalText => {
                *state = state.advance(RequestState::Streaming);
                let mut reader = IncrementalReader::new(
                    response.body,
                    response.content_length,
                    self.config.effective_chunk_size(),
                );
                while let Some(chunk) = reader.next_chunk().await? {
                    self.sink.emit(NetworkEvent::IncrementalData {
                        id: spec.id,
                        chunk: chunk.text,
                        progress: chunk.progress,
                        total: chunk.total,
                    });
                }
            }
            ResponseMode::BufferedText => {
                *state = state.advance(RequestState::Buffering);
                let body = read_to_end(response.body, response.content_length).await?;
                let text = decode_text(&body)?;
                if !text.is_empty() {
                    self.sink.emit(NetworkEvent::DataReceived { id: spec.id, data: text });
                }
            }
            ResponseMode::BufferedBinary => {
                *state = state.advance(RequestState::Buffering);
                let body = read_to_end(response.body, response.content_length).await?;
                self.sink.emit(NetworkEvent::DataReceived {
                    id: spec.id,
                    data: STANDARD.encode(&body),
                });
            }
        }
        Ok(())
    }

    /// Assemble the outbound message, reading a URI body if there is one.
    async fn outbound(
        &self,
        spec: &RequestSpec,
        prepared: PreparedBody,
    ) -> Result<OutboundRequest> {
        let mut headers = Vec::with_capacity(spec.headers.len() + 1);
        apply_request_headers(&mut headers, &spec.headers);
        if let Some(agent) = &self.config.user_agent
            && find_header(&headers, "user-agent").is_none()
        {
            set_header(&mut headers, "User-Agent", agent);
        }

        let content_headers = prepared.content_headers();
        let body = match prepared.source {
            BodySource::Empty => None,
            BodySource::Inline(bytes) => Some(bytes),
            BodySource::Uri(uri) => {
                let bytes = read_uri(&uri).await?;
                Some(encode_content(bytes, prepared.content_encoding.as_deref())?)
            }
        };

        Ok(OutboundRequest {
            method: spec.method.clone(),
            url: spec.url.clone(),
            headers,
            content_headers,
            body,
        })
    }

    /// Turn `result` into the single terminal outcome for `id`.
    fn finish(&self, id: RequestId, state: RequestState, result: Result<()>) -> RequestOutcome {
        match result {
            Ok(()) => {
                state.advance(RequestState::Terminal(Terminal::Success));
                tracing::debug!("request succeeded");
                self.sink.emit(NetworkEvent::success(id));
                RequestOutcome::Succeeded
            }
            Err(Error::Cancelled) => {
                state.advance(RequestState::Terminal(Terminal::Cancelled));
                tracing::debug!("request cancelled");
                RequestOutcome::Cancelled
            }
            Err(e) => {
                state.advance(RequestState::Terminal(Terminal::Error));
                let failure = RequestFailure::from(&e);
                if self.shutdown.is_triggered() {
                    tracing::warn!(error = %e, "suppressing request failure during shutdown");
                    return RequestOutcome::Suppressed(failure);
                }
                tracing::debug!(error = %e, timed_out = failure.timed_out, "request failed");
                self.sink.emit(NetworkEvent::failure(id, &e));
                RequestOutcome::Failed(failure)
            }
        }
    }
}

async fn expire(deadline: Option<Duration>) {
    match deadline {
        Some(after) => tokio::time::sleep(after).await,
        None => std::future::pending().await,
    }
}

async fn read_to_end<E>(
    mut body: BoxStream<'static, std::result::Result<Bytes, E>>,
    hint: Option<u64>,
) -> Result<Bytes>
where
    E: std::error::Error,
{
    let capacity = hint
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(0)
        .min(16 * 1024 * 1024);
    let mut buf = BytesMut::with_capacity(capacity);
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk.map_err(Error::transport)?);
    }
    Ok(buf.freeze())
}

/// Local path for a body URI: `file://` URLs or bare filesystem paths.
pub(crate) fn uri_to_path(uri: &str) -> Result<PathBuf> {
    let unresolvable = |message: &str| Error::BodyResolution {
        uri: uri.to_string(),
        message: message.to_string(),
    };
    match Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|()| unresolvable("not a local file path")),
        // A single-letter scheme is a Windows drive prefix, not a URL.
        Ok(url) if url.scheme().len() == 1 => Ok(PathBuf::from(uri)),
        Ok(url) => Err(unresolvable(&format!("unsupported scheme '{}'", url.scheme()))),
        Err(_) => Ok(PathBuf::from(uri)),
    }
}

async fn read_uri(uri: &str) -> Result<Bytes> {
    let path = uri_to_path(uri)?;
    tokio::fs::read(&path)
        .await
        .map(Bytes::from)
        .map_err(|e| Error::BodyResolution {
            uri: uri.to_string(),
            message: e.to_string(),
        })
}
