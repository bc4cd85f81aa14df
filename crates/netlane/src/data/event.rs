use std::collections::BTreeMap;

use serde::Serialize;

use super::request::RequestId;

/// Response headers keyed by lower-cased name. Repeated names are joined
/// with `", "` in encounter order.
pub type ResponseHeaders = BTreeMap<String, String>;

/// Payload of a failed terminal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestFailure {
    pub message: String,
    pub timed_out: bool,
}

impl RequestFailure {
    pub fn new(message: impl Into<String>, timed_out: bool) -> Self {
        Self {
            message: message.into(),
            timed_out,
        }
    }
}

impl From<&crate::Error> for RequestFailure {
    fn from(e: &crate::Error) -> Self {
        Self::new(e.to_string(), e.is_timeout())
    }
}

/// One-way notification delivered to the host.
///
/// Every request produces zero or more non-terminal events followed by
/// exactly one `RequestCompleted`, unless it was aborted or failed during
/// shutdown, in which case it ends silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum NetworkEvent {
    /// Status and headers arrived; emitted before any body is read.
    ResponseReceived {
        id: RequestId,
        status: u16,
        headers: ResponseHeaders,
        /// Absolute path of the final request URI, after redirects.
        url: String,
    },

    IncrementalData {
        id: RequestId,
        chunk: String,
        /// Cumulative bytes delivered so far, including this chunk.
        progress: u64,
        total: Option<u64>,
    },

    /// Full text body, or base64 for binary responses.
    DataReceived { id: RequestId, data: String },

    /// Terminal event. `error` is `None` on success.
    RequestCompleted {
        id: RequestId,
        error: Option<RequestFailure>,
    },
}

impl NetworkEvent {
    pub fn id(&self) -> RequestId {
        match self {
            NetworkEvent::ResponseReceived { id, .. }
            | NetworkEvent::IncrementalData { id, .. }
            | NetworkEvent::DataReceived { id, .. }
            | NetworkEvent::RequestCompleted { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NetworkEvent::ResponseReceived { .. } => "response-received",
            NetworkEvent::IncrementalData { .. } => "incremental-data",
            NetworkEvent::DataReceived { .. } => "data-received",
            NetworkEvent::RequestCompleted { .. } => "request-completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NetworkEvent::RequestCompleted { .. })
    }

    /// Total for progress events with `-1` standing in for "unknown".
    pub fn total_or_sentinel(&self) -> Option<i64> {
        match self {
            NetworkEvent::IncrementalData { total, .. } => Some(
                total
                    .and_then(|t| i64::try_from(t).ok())
                    .unwrap_or(-1),
            ),
            _ => None,
        }
    }

    pub(crate) fn success(id: RequestId) -> Self {
        NetworkEvent::RequestCompleted { id, error: None }
    }

    pub(crate) fn failure(id: RequestId, error: &crate::Error) -> Self {
        NetworkEvent::RequestCompleted {
            id,
            error: Some(RequestFailure::from(error)),
        }
    }
}
