use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::Instrument;

use crate::core::validate;
use crate::data::{ManagerConfig, RequestId, RequestSpec, SendRequest};
use crate::effects::executor::{RequestExecutor, ShutdownSignal};
use crate::effects::http::Transport;
use crate::effects::registry::{CancelStatus, CancellationRegistry};
use crate::effects::sink::EventSink;
use crate::error::{Error, Result};

/// Public entry point: accepts requests, aborts them, and tears down.
///
/// Results never come back from [`send`](Self::send); they arrive on the
/// [`EventSink`] the manager was built with.
///
/// # Examples
///
/// ```no_run
/// use netlane::{ChannelSink, ManagerConfig, RequestManager, ReqwestTransport};
///
/// # async fn run() -> netlane::Result<()> {
/// let (sink, mut events) = ChannelSink::new();
/// let manager = RequestManager::builder(ReqwestTransport::new(), sink)
///     .config(ManagerConfig::default().user_agent("example/1.0"))
///     .build()?;
///
/// let call = serde_json::from_str(r#"{
///     "method": "GET",
///     "url": "https://example.com/",
///     "requestId": 1,
///     "responseType": "text"
/// }"#)
/// .unwrap();
/// manager.send_request(call)?;
///
/// while let Some(event) = events.recv().await {
///     if event.is_terminal() {
///         break;
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct RequestManager<T, S> {
    executor: RequestExecutor<T, S>,
    registry: CancellationRegistry,
    shutdown: ShutdownSignal,
}

pub struct RequestManagerBuilder<T, S> {
    transport: T,
    sink: S,
    config: ManagerConfig,
    runtime: Option<Handle>,
}

impl<T, S> RequestManagerBuilder<T, S>
where
    T: Transport + 'static,
    S: EventSink + 'static,
{
    #[must_use]
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Runtime that request tasks are spawned on.
    ///
    /// Defaults to the runtime the builder is finished on.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<RequestManager<T, S>> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| Error::NoRuntime)?,
        };
        let shutdown = ShutdownSignal::new();
        Ok(RequestManager {
            executor: RequestExecutor::new(
                Arc::new(self.transport),
                Arc::new(self.sink),
                Arc::new(self.config),
                shutdown.clone(),
            ),
            registry: CancellationRegistry::new(runtime),
            shutdown,
        })
    }
}

impl<T, S> RequestManager<T, S>
where
    T: Transport + 'static,
    S: EventSink + 'static,
{
    pub fn builder(transport: T, sink: S) -> RequestManagerBuilder<T, S> {
        RequestManagerBuilder {
            transport,
            sink,
            config: ManagerConfig::default(),
            runtime: None,
        }
    }

    /// Accept `spec` for asynchronous processing.
    ///
    /// Only a request whose id is still in flight is rejected here; every
    /// later failure is reported through the sink.
    pub fn send(&self, spec: RequestSpec) -> Result<()> {
        let id = spec.id;
        let span = tracing::debug_span!("request", %id, method = %spec.method, url = %spec.url);
        let executor = self.executor.clone();
        self.registry.register(id, move |cancel| {
            async move { executor.execute(spec, cancel).await }.instrument(span)
        })?;
        tracing::trace!(%id, "request accepted");
        Ok(())
    }

    /// Validate a raw host call and accept it.
    ///
    /// # Errors
    ///
    /// [`Error::Input`] for a missing method or URL or an unknown response
    /// type, [`Error::DuplicateId`] if the id is still in flight.
    pub fn send_request(&self, call: SendRequest) -> Result<RequestId> {
        let spec = validate(call)?;
        let id = spec.id;
        self.send(spec)?;
        Ok(id)
    }

    /// Abort an in-flight request. Unknown or finished ids are ignored.
    pub fn abort(&self, id: RequestId) -> CancelStatus {
        let status = self.registry.cancel(id);
        tracing::debug!(%id, ?status, "abort requested");
        status
    }

    /// Stop reporting failures and cancel everything in flight.
    ///
    /// Does not wait for tasks to unwind.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
        let signalled = self.registry.cancel_all();
        tracing::debug!(signalled, "request manager shutting down");
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Number of requests that have not yet reached a terminal state.
    pub fn in_flight(&self) -> usize {
        self.registry.len()
    }
}
