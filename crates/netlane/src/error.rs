//! Error types for netlane.

use thiserror::Error;

use crate::data::RequestId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    Input(String),

    #[error("Payload is set but no 'content-type' header specified")]
    MissingContentType,

    #[error("request {0} is already in flight")]
    DuplicateId(RequestId),

    #[error("{0}")]
    Transport(String),

    #[error("failed to read request body from '{uri}': {message}")]
    BodyResolution { uri: String, message: String },

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("failed to decode response body: {0}")]
    Decode(String),

    #[error("request timed out")]
    Timeout,

    #[error("request was cancelled")]
    Cancelled,

    #[error("no tokio runtime available to schedule requests")]
    NoRuntime,
}

impl Error {
    /// Whether the failure came from the request's own deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout)
    }

    pub(crate) fn transport<E: std::error::Error>(e: E) -> Self {
        Error::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
