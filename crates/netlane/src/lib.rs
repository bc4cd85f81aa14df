//! Concurrent HTTP request lifecycle management.
//!
//! Accepts request descriptions keyed by caller-assigned ids, runs them on a
//! tokio runtime against an injected [`Transport`], and reports results to a
//! host through an [`EventSink`], either as one buffered payload or as
//! incremental text chunks with progress accounting.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable request, event and configuration types
//! - [`core`] - Pure transformations (headers, bodies, validation, decoding)
//! - [`effects`] - Transport, sinks, cancellation registry, executor and manager
//!
//! # Guarantees
//!
//! - Every accepted request ends in exactly one of: a success event, an
//!   error event, silence after an abort, or silence after shutdown.
//! - Timeouts and aborts share one boundary per request, so the terminal
//!   event tells a deadline (`timed_out = true`) from any other failure.
//! - Per-request resources are owned by the request task and released on
//!   every exit path.

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use data::{
    BodyDescription, FormField, FormValue, ManagerConfig, Method, NetworkEvent, RequestFailure,
    RequestId, RequestSpec, ResponseHeaders, ResponseMode, SendRequest,
};
pub use effects::{
    CancelStatus, ChannelSink, EventSink, OutboundRequest, RequestManager, RequestOutcome,
    Transport, TransportResponse,
};
#[cfg(feature = "reqwest")]
pub use effects::{ReqwestError, ReqwestTransport};
pub use error::{Error, Result};
